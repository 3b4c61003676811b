//! Authentication module
//!
//! Access-token signing/validation, password hashing, refresh-token values
//! and the `AuthService` that ties them to the stores.

mod claims;
mod jwt;
mod password;
mod refresh_token;
mod service;
mod session;

pub use claims::{CandidateSnapshot, Claims, CompanySnapshot, SessionProfile};
pub use jwt::{generate_access_token, validate_access_token, ExpiryPolicy, IssuedAccessToken};
pub use password::{hash_password, verify_password, PasswordPolicy};
pub use refresh_token::{generate_refresh_token, hash_refresh_token};
pub use service::{normalize_email, AuthService};
pub use session::{AuthResult, Session};
