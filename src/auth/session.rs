use serde::Serialize;
use uuid::Uuid;

use crate::error::AuthError;

/// Tokens minted by a successful login, registration or refresh
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds
    pub expires_in: i64,
}

/// Uniform outcome handed to callers of the auth core
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    pub errors: Vec<String>,
}

impl AuthResult {
    pub fn success(session: &Session) -> Self {
        Self {
            succeeded: true,
            token: Some(session.access_token.clone()),
            refresh_token: Some(session.refresh_token.clone()),
            token_type: Some("Bearer".to_string()),
            expires_in: Some(session.expires_in),
            errors: Vec::new(),
        }
    }

    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            succeeded: false,
            token: None,
            refresh_token: None,
            token_type: None,
            expires_in: None,
            errors,
        }
    }
}

impl From<Result<Session, AuthError>> for AuthResult {
    fn from(result: Result<Session, AuthError>) -> Self {
        match result {
            Ok(session) => AuthResult::success(&session),
            Err(e) => AuthResult::failure(e.messages()),
        }
    }
}
