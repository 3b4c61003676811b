//! Access-token signing and validation (HS256 only).

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, SessionProfile};
use crate::configuration::JwtSettings;
use crate::domain::User;
use crate::error::AuthError;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Whether the validator rejects tokens past their `exp`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// Protected API calls
    Enforce,
    /// The refresh path, where an expired access token is the expected input
    Ignore,
}

/// A freshly signed access token together with the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub claims: Claims,
}

/// Sign a new access token for `user`
///
/// # Errors
/// Returns `AuthError::Internal` if encoding fails
pub fn generate_access_token(
    user: &User,
    info: SessionProfile,
    config: &JwtSettings,
) -> Result<IssuedAccessToken, AuthError> {
    let claims = Claims::new(
        user,
        info,
        config.access_token_lifetime_minutes,
        config.issuer.clone(),
    );

    let token = encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(IssuedAccessToken { token, claims })
}

/// Validate the signature, algorithm and issuer of an access token
///
/// The header algorithm is checked before any claim is decoded, so unsigned
/// or differently-signed tokens never reach the caller.
///
/// # Errors
/// `TokenExpired` if `expiry` is `Enforce` and the token is past its `exp`,
/// `InvalidToken` for anything else
pub fn validate_access_token(
    token: &str,
    config: &JwtSettings,
    expiry: ExpiryPolicy,
) -> Result<Claims, AuthError> {
    let header = decode_header(token).map_err(|e| {
        tracing::warn!("JWT header rejected: {}", e);
        AuthError::InvalidToken
    })?;
    if header.alg != ALGORITHM {
        tracing::warn!(alg = ?header.alg, "JWT signed with unexpected algorithm");
        return Err(AuthError::InvalidToken);
    }

    let mut validation = Validation::new(ALGORITHM);
    validation.set_issuer(&[&config.issuer]);
    validation.validate_exp = expiry == ExpiryPolicy::Enforce;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => {
            tracing::warn!("JWT validation error: {}", e);
            AuthError::InvalidToken
        }
    })
}
