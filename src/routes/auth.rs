//! Authentication Routes
//!
//! Login, company/candidate registration, token refresh and the current
//! session. Every successful call also sets the refresh token as an
//! HttpOnly cookie.

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth::{AuthResult, AuthService, Claims, Session};
use crate::domain::{Attachment, Candidate, Company};
use crate::error::{AppError, ValidationError};
use crate::validators::{is_valid_email, optional_field, required_field};

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A file already read by the client, base64-encoded
#[derive(Deserialize)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: String,
}

impl UploadedFile {
    fn into_attachment(self, prefix: &str, field: &str) -> Result<Attachment, ValidationError> {
        let content = STANDARD
            .decode(self.data.trim())
            .map_err(|_| ValidationError::InvalidFormat(field.to_string()))?;
        if content.is_empty() {
            return Err(ValidationError::EmptyField(field.to_string()));
        }
        Ok(Attachment::renamed(prefix, &self.file_name, content))
    }
}

#[derive(Deserialize)]
pub struct RegisterCompanyRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub address: String,
    pub description: String,
    pub contact_number: Option<String>,
    pub category: Option<String>,
    pub logo: Option<UploadedFile>,
}

#[derive(Deserialize)]
pub struct RegisterCandidateRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub gender: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub resume: Option<UploadedFile>,
    pub photo: Option<UploadedFile>,
}

/// The refresh token may come in the body or, failing that, the cookie
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub token: String,
    pub refresh_token: Option<String>,
}

fn refresh_cookie(value: &str, lifetime_days: i64) -> Cookie<'static> {
    Cookie::build(REFRESH_TOKEN_COOKIE, value.to_string())
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(CookieDuration::days(lifetime_days))
        .finish()
}

fn session_response(
    mut builder: HttpResponseBuilder,
    session: &Session,
    service: &AuthService,
) -> HttpResponse {
    builder
        .cookie(refresh_cookie(
            &session.refresh_token,
            service.config().refresh_token_lifetime_days,
        ))
        .json(AuthResult::success(session))
}

fn require_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }
    Ok(())
}

/// POST /api/auth/login
///
/// # Errors
/// - 400: Malformed email or empty password
/// - 404: No account with this email
/// - 401: Wrong password
pub async fn login(
    form: web::Json<LoginRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    require_password(&form.password)?;

    let session = service.login(&email, &form.password).await?;

    Ok(session_response(HttpResponse::Ok(), &session, &service))
}

/// POST /api/auth/registercompany
///
/// # Errors
/// - 400: Invalid input or password rejected by the policy
/// - 409: Email already registered
/// - 500: Profile could not be stored (the account is rolled back)
pub async fn register_company(
    form: web::Json<RegisterCompanyRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let email = is_valid_email(&form.email)?;
    require_password(&form.password)?;

    let company = Company {
        name: required_field("name", &form.name)?,
        address: required_field("address", &form.address)?,
        description: required_field("description", &form.description)?,
        contact_number: optional_field("contact_number", form.contact_number.as_deref())?,
        category: optional_field("category", form.category.as_deref())?,
        logo: form
            .logo
            .map(|file| file.into_attachment("logo", "logo"))
            .transpose()?,
        ..Company::default()
    };

    let session = service
        .register_company(&email, &form.password, company)
        .await?;

    Ok(session_response(HttpResponse::Created(), &session, &service))
}

/// POST /api/auth/registercandidate
///
/// Same error contract as `register_company`.
pub async fn register_candidate(
    form: web::Json<RegisterCandidateRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let email = is_valid_email(&form.email)?;
    require_password(&form.password)?;

    let candidate = Candidate {
        first_name: required_field("first_name", &form.first_name)?,
        last_name: required_field("last_name", &form.last_name)?,
        address: required_field("address", &form.address)?,
        gender: optional_field("gender", form.gender.as_deref())?,
        birthdate: form.birthdate,
        resume: form
            .resume
            .map(|file| file.into_attachment("resume", "resume"))
            .transpose()?,
        photo: form
            .photo
            .map(|file| file.into_attachment("photo", "photo"))
            .transpose()?,
        ..Candidate::default()
    };

    let session = service
        .register_candidate(&email, &form.password, candidate)
        .await?;

    Ok(session_response(HttpResponse::Created(), &session, &service))
}

/// POST /api/auth/refreshtoken
///
/// Rotates the refresh token. Reusing an already redeemed refresh token
/// revokes every session of its owner.
///
/// # Errors
/// - 400: No refresh token in body or cookie
/// - 404: Unknown refresh token
/// - 401: Invalid access token, expired/mismatched/revoked refresh token
pub async fn refresh_token(
    req: HttpRequest,
    form: web::Json<RefreshTokenRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let refresh_token = form
        .refresh_token
        .filter(|token| !token.trim().is_empty())
        .or_else(|| req.cookie(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ValidationError::Missing("Refresh Token Cookie Is Not Set!".to_string()))?;

    let session = service
        .refresh_token(form.token.trim(), refresh_token.trim())
        .await?;

    Ok(session_response(HttpResponse::Ok(), &session, &service))
}

/// GET /api/auth/me
///
/// Claims of the presented access token; requires the JWT middleware.
pub async fn current_session(claims: web::ReqData<Claims>) -> HttpResponse {
    HttpResponse::Ok().json(claims.into_inner())
}
