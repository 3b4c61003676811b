//! Error Handling Module
//!
//! Layers, from the inside out:
//! 1. `StoreError` for persistence collaborators (credential store, repositories, ledger)
//! 2. `AuthError` for the authentication core (the taxonomy callers see)
//! 3. `AppError` for the HTTP layer, mapped to status codes and a uniform JSON body

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

// ============================================================================
// 1. DOMAIN-SPECIFIC ERROR TYPES
// ============================================================================

/// Validation errors for request input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(String),
    #[error("{0} is too short (minimum {1} characters)")]
    TooShort(String, usize),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(String, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(String),
    #[error("{0}")]
    Missing(String),
}

/// Errors raised by the persistence collaborators
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate entry: {0}")]
    Duplicate(String),
    /// Input refused by the store itself, e.g. a password that breaks the policy
    #[error("Rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                StoreError::Duplicate(db.message().to_string())
            }
            _ => StoreError::Database(err.to_string()),
        }
    }
}

/// Failures of the authentication core
///
/// Every variant is recovered at the service boundary and rendered as a
/// human-readable message inside an `AuthResult`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User With Email {0} Does Not Exist!")]
    UserNotFound(String),
    #[error("Login Failed, Please Verify Your Credentials!")]
    InvalidCredentials,
    #[error("User With Email {0} Already Exists!")]
    AlreadyExists(String),
    #[error("{}", .0.join("; "))]
    Rejected(Vec<String>),
    #[error("Token Is Invalid!")]
    InvalidToken,
    #[error("Missing authentication token")]
    MissingToken,
    #[error("Refresh Token Does Not Exist!")]
    RefreshTokenNotFound,
    #[error("Token Has Expired!")]
    TokenExpired,
    #[error("Refresh Token Does Not Match The Access Token!")]
    TokenMismatch,
    #[error("Refresh Token Has Been Revoked!")]
    TokenRevoked,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Messages exposed to the caller, one per underlying problem
    pub fn messages(&self) -> Vec<String> {
        match self {
            AuthError::Rejected(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Stable machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::UserNotFound(_) => "USER_NOT_FOUND",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AlreadyExists(_) => "ALREADY_EXISTS",
            AuthError::Rejected(_) => "REJECTED",
            AuthError::InvalidToken => "TOKEN_INVALID",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::RefreshTokenNotFound => "REFRESH_TOKEN_NOT_FOUND",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::TokenMismatch => "TOKEN_MISMATCH",
            AuthError::TokenRevoked => "TOKEN_REVOKED",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(errors) => AuthError::Rejected(errors),
            other => AuthError::Internal(other.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required config: {0}")]
    MissingRequired(String),
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

// ============================================================================
// 2. UNIFIED APPLICATION ERROR TYPE
// ============================================================================

/// Central error type for the HTTP layer
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error body returned for every failed request
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for correlating with server logs
    pub error_id: String,
    pub succeeded: bool,
    /// Human-readable messages
    pub errors: Vec<String>,
    /// Error code for client-side handling
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, errors: Vec<String>, code: String, status: u16) -> Self {
        Self {
            error_id,
            succeeded: false,
            errors,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Auth(e) => e.code(),
        }
    }

    /// Messages safe to show to the client; internals are masked
    fn public_messages(&self) -> Vec<String> {
        match self {
            AppError::Validation(e) => vec![e.to_string()],
            AppError::Auth(AuthError::Internal(_)) => vec!["Internal server error".to_string()],
            AppError::Auth(e) => e.messages(),
        }
    }

    fn log_error(&self, error_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Validation error");
            }
            AppError::Auth(AuthError::Internal(msg)) => {
                tracing::error!(error_id = error_id, error = %msg, "Internal error");
            }
            AppError::Auth(e) => {
                tracing::warn!(error_id = error_id, code = e.code(), error = %e, "Authentication error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(e) => match e {
                AuthError::Rejected(_) => StatusCode::BAD_REQUEST,
                AuthError::UserNotFound(_) | AuthError::RefreshTokenNotFound => {
                    StatusCode::NOT_FOUND
                }
                AuthError::AlreadyExists(_) => StatusCode::CONFLICT,
                AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::InvalidCredentials
                | AuthError::InvalidToken
                | AuthError::MissingToken
                | AuthError::TokenExpired
                | AuthError::TokenMismatch
                | AuthError::TokenRevoked => StatusCode::UNAUTHORIZED,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&error_id);

        let status = self.status_code();
        let body = ErrorResponse::new(
            error_id,
            self.public_messages(),
            self.code().to_string(),
            status.as_u16(),
        );

        HttpResponse::build(status).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email".to_string());
        assert_eq!(err.to_string(), "email is empty");
    }

    #[test]
    fn test_rejected_store_error_keeps_every_message() {
        let err: AuthError = StoreError::Rejected(vec![
            "password is too short (minimum 8 characters)".to_string(),
            "password must contain a digit".to_string(),
        ])
        .into();

        assert_eq!(err.messages().len(), 2);
        assert_eq!(err.code(), "REJECTED");
    }

    #[test]
    fn test_database_error_becomes_internal() {
        let err: AuthError = StoreError::Database("connection reset".to_string()).into();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::from(AuthError::TokenRevoked).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::AlreadyExists("a@x.com".to_string())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(AuthError::RefreshTokenNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(ValidationError::InvalidFormat("email".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_failures_surface_as_internal_server_error() {
        let err = AppError::from(AuthError::from(StoreError::Database("disk full".to_string())));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_internal_details_are_masked() {
        let err = AppError::from(AuthError::Internal("pool timed out".to_string()));
        assert_eq!(err.public_messages(), vec!["Internal server error".to_string()]);
    }

    #[test]
    fn test_error_response_creation() {
        let response = ErrorResponse::new(
            "test-123".to_string(),
            vec!["Test error".to_string()],
            "TEST_ERROR".to_string(),
            400,
        );

        assert_eq!(response.error_id, "test-123");
        assert!(!response.succeeded);
        assert_eq!(response.code, "TEST_ERROR");
        assert_eq!(response.status, 400);
    }
}
