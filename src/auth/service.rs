//! Authentication core
//!
//! Login, registration and refresh-token rotation over the store traits.
//! Refresh tokens are single-use: a successful redemption revokes the row
//! and mints a new pair. Presenting a token that is already revoked is
//! treated as theft, and every refresh token of that user is revoked.

use std::sync::Arc;

use crate::auth::claims::{CandidateSnapshot, CompanySnapshot, SessionProfile};
use crate::auth::jwt::{generate_access_token, validate_access_token, ExpiryPolicy};
use crate::auth::refresh_token::{generate_refresh_token, hash_refresh_token};
use crate::auth::session::Session;
use crate::configuration::JwtSettings;
use crate::domain::{Candidate, Company, NewUser, RefreshTokenRecord, User, UserRole};
use crate::error::{AuthError, StoreError};
use crate::store::{CandidateRepository, CompanyRepository, CredentialStore, RefreshTokenLedger};

/// Trim and lower-case an email so lookups are case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    companies: Arc<dyn CompanyRepository>,
    candidates: Arc<dyn CandidateRepository>,
    ledger: Arc<dyn RefreshTokenLedger>,
    config: JwtSettings,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        companies: Arc<dyn CompanyRepository>,
        candidates: Arc<dyn CandidateRepository>,
        ledger: Arc<dyn RefreshTokenLedger>,
        config: JwtSettings,
    ) -> Self {
        Self {
            credentials,
            companies,
            candidates,
            ledger,
            config,
        }
    }

    pub fn config(&self) -> &JwtSettings {
        &self.config
    }

    /// # Errors
    /// `UserNotFound` for an unknown email, `InvalidCredentials` for a wrong password
    #[tracing::instrument(name = "Login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);

        let user = self
            .credentials
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(email.clone()))?;

        if !self.credentials.check_password(&user, password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.issue_session(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in successfully");
        Ok(session)
    }

    #[tracing::instrument(name = "Register company", skip(self, password, company))]
    pub async fn register_company(
        &self,
        email: &str,
        password: &str,
        mut company: Company,
    ) -> Result<Session, AuthError> {
        let user = self.create_account(email, password, UserRole::Company).await?;

        company.account_id = Some(user.id);
        if let Err(e) = self.companies.add_company(company).await {
            self.roll_back_account(&user, &e).await;
            return Err(AuthError::Internal(
                "failed to store company profile".to_string(),
            ));
        }

        let session = self.issue_session(&user).await?;
        tracing::info!(user_id = %user.id, "Company registered successfully");
        Ok(session)
    }

    #[tracing::instrument(name = "Register candidate", skip(self, password, candidate))]
    pub async fn register_candidate(
        &self,
        email: &str,
        password: &str,
        mut candidate: Candidate,
    ) -> Result<Session, AuthError> {
        let user = self.create_account(email, password, UserRole::Candidate).await?;

        candidate.account_id = Some(user.id);
        if let Err(e) = self.candidates.add_candidate(candidate).await {
            self.roll_back_account(&user, &e).await;
            return Err(AuthError::Internal(
                "failed to store candidate profile".to_string(),
            ));
        }

        let session = self.issue_session(&user).await?;
        tracing::info!(user_id = %user.id, "Candidate registered successfully");
        Ok(session)
    }

    /// Redeem `refresh_token` for a new session
    ///
    /// Checks, in order: access-token signature (expiry ignored), ledger
    /// lookup, ledger expiry, `jti` binding, revocation. The revoke is a
    /// conditional write, so of two concurrent redemptions only one wins and
    /// the other is handled exactly like a replay.
    #[tracing::instrument(name = "Refresh token", skip_all)]
    pub async fn refresh_token(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Session, AuthError> {
        let claims = validate_access_token(access_token, &self.config, ExpiryPolicy::Ignore)
            .map_err(|_| AuthError::InvalidToken)?;

        let token_hash = hash_refresh_token(refresh_token);
        let stored = self
            .ledger
            .find(&token_hash)
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)?;

        if stored.is_expired() {
            tracing::info!(user_id = %stored.user_id, "Refresh token expired");
            return Err(AuthError::TokenExpired);
        }

        if stored.jwt_id != claims.jti {
            tracing::warn!(user_id = %stored.user_id, "Refresh token presented with a foreign access token");
            return Err(AuthError::TokenMismatch);
        }

        if stored.is_revoked || !self.ledger.revoke_if_active(&token_hash).await? {
            let revoked = self.ledger.revoke_all_for_user(stored.user_id).await?;
            tracing::warn!(
                user_id = %stored.user_id,
                revoked_tokens = revoked,
                "Revoked refresh token reused, all sessions of the user revoked"
            );
            return Err(AuthError::TokenRevoked);
        }

        let user = self
            .credentials
            .find_by_id(stored.user_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(claims.email.clone()))?;

        let session = self.issue_session(&user).await?;
        tracing::info!(user_id = %user.id, "Token refreshed successfully");
        Ok(session)
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let email = normalize_email(email);

        if self.credentials.find_by_email(&email).await?.is_some() {
            return Err(AuthError::AlreadyExists(email));
        }

        let new_user = NewUser {
            email: email.clone(),
            role,
        };
        self.credentials
            .create(new_user, password)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => AuthError::AlreadyExists(email),
                other => other.into(),
            })
    }

    /// Compensating delete for a credential whose profile could not be stored.
    /// Failure here is logged, never surfaced.
    async fn roll_back_account(&self, user: &User, cause: &StoreError) {
        tracing::error!(user_id = %user.id, error = %cause, "Profile creation failed, rolling back account");

        if let Err(e) = self.credentials.delete(user).await {
            tracing::error!(
                user_id = %user.id,
                error = %e,
                "Failed to roll back account after profile creation failure"
            );
        }
    }

    async fn load_profile(&self, user: &User) -> Result<SessionProfile, AuthError> {
        let profile = match user.role {
            UserRole::Company => self
                .companies
                .find_by_account(user.id)
                .await?
                .map(|company| SessionProfile::Company(CompanySnapshot::from(&company))),
            UserRole::Candidate => self
                .candidates
                .find_by_account(user.id)
                .await?
                .map(|candidate| SessionProfile::Candidate(CandidateSnapshot::from(&candidate))),
        };
        Ok(profile.unwrap_or_default())
    }

    /// Sign an access token and record the refresh token bound to its `jti`
    async fn issue_session(&self, user: &User) -> Result<Session, AuthError> {
        let profile = self.load_profile(user).await?;
        let issued = generate_access_token(user, profile, &self.config)?;

        let refresh_token = generate_refresh_token(self.config.refresh_token_length);
        let record = RefreshTokenRecord::new(
            hash_refresh_token(&refresh_token),
            issued.claims.jti.clone(),
            user.id,
            self.config.refresh_token_lifetime_days,
        );
        self.ledger.insert(&record).await?;

        Ok(Session {
            user_id: user.id,
            access_token: issued.token,
            refresh_token,
            expires_in: self.config.access_token_lifetime_secs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  John@Example.COM "), "john@example.com");
    }
}
