//! Persistence collaborators of the authentication core
//!
//! The core only talks to these traits. `postgres` backs them with sqlx,
//! `memory` with mutex-guarded maps.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Candidate, Company, NewUser, RefreshTokenRecord, User};
use crate::error::StoreError;

pub use memory::{
    InMemoryCandidateRepository, InMemoryCompanyRepository, InMemoryCredentialStore,
    InMemoryRefreshTokenLedger,
};
pub use postgres::{
    PgCandidateRepository, PgCompanyRepository, PgCredentialStore, PgRefreshTokenLedger,
};

/// Holds account identities and verifies passwords
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `email` is expected to be normalized (trimmed, lower-cased)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn check_password(&self, user: &User, password: &str) -> Result<bool, StoreError>;

    /// # Errors
    /// `StoreError::Rejected` when the password breaks the store's policy,
    /// `StoreError::Duplicate` when the email is already taken
    async fn create(&self, user: NewUser, password: &str) -> Result<User, StoreError>;

    async fn delete(&self, user: &User) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Persists the profile; `account_id` must already be linked
    async fn add_company(&self, company: Company) -> Result<Company, StoreError>;

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Company>, StoreError>;
}

#[async_trait]
pub trait CandidateRepository: Send + Sync {
    async fn add_candidate(&self, candidate: Candidate) -> Result<Candidate, StoreError>;

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Candidate>, StoreError>;
}

/// Refresh-token rows keyed by token hash
#[async_trait]
pub trait RefreshTokenLedger: Send + Sync {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError>;

    async fn find(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Flips `is_revoked` only if the row is still active.
    ///
    /// Returns `true` for exactly one caller per row; a concurrent redemption
    /// that loses the race gets `false`.
    async fn revoke_if_active(&self, token_hash: &str) -> Result<bool, StoreError>;

    /// Revokes every active row owned by `user_id`, returning how many changed
    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, StoreError>;
}
