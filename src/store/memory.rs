use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{CandidateRepository, CompanyRepository, CredentialStore, RefreshTokenLedger};
use crate::auth::{hash_password, verify_password, PasswordPolicy};
use crate::domain::{Candidate, Company, NewUser, RefreshTokenRecord, User};
use crate::error::StoreError;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Database("in-memory store lock poisoned".to_string()))
}

/// Credential store held in process memory
pub struct InMemoryCredentialStore {
    users: Mutex<HashMap<Uuid, User>>,
    policy: PasswordPolicy,
}

impl InMemoryCredentialStore {
    pub fn new(policy: PasswordPolicy) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            policy,
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users)?
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users)?.get(&id).cloned())
    }

    async fn check_password(&self, user: &User, password: &str) -> Result<bool, StoreError> {
        verify_password(password, &user.password_hash)
    }

    async fn create(&self, user: NewUser, password: &str) -> Result<User, StoreError> {
        // Hash outside the lock; bcrypt is slow on purpose
        let password_hash = hash_password(password, &self.policy)?;

        let mut users = lock(&self.users)?;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Duplicate(user.email));
        }

        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete(&self, user: &User) -> Result<(), StoreError> {
        lock(&self.users)?
            .remove(&user.id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user.id)))
    }
}

struct ProfileTable<T> {
    rows: Vec<T>,
    next_id: i64,
}

impl<T> Default for ProfileTable<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

/// Company repository held in process memory
///
/// `failing()` builds one whose inserts always fail, for exercising the
/// registration rollback.
#[derive(Default)]
pub struct InMemoryCompanyRepository {
    table: Mutex<ProfileTable<Company>>,
    fail_inserts: bool,
}

impl InMemoryCompanyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_inserts: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.table.lock().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn add_company(&self, mut company: Company) -> Result<Company, StoreError> {
        if self.fail_inserts {
            return Err(StoreError::Database("company insert failed".to_string()));
        }

        let mut table = lock(&self.table)?;
        company.id = Some(table.next_id);
        table.next_id += 1;
        table.rows.push(company.clone());
        Ok(company)
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Company>, StoreError> {
        Ok(lock(&self.table)?
            .rows
            .iter()
            .find(|c| c.account_id == Some(account_id))
            .cloned())
    }
}

/// Candidate repository held in process memory
#[derive(Default)]
pub struct InMemoryCandidateRepository {
    table: Mutex<ProfileTable<Candidate>>,
    fail_inserts: bool,
}

impl InMemoryCandidateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_inserts: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.table.lock().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CandidateRepository for InMemoryCandidateRepository {
    async fn add_candidate(&self, mut candidate: Candidate) -> Result<Candidate, StoreError> {
        if self.fail_inserts {
            return Err(StoreError::Database("candidate insert failed".to_string()));
        }

        let mut table = lock(&self.table)?;
        candidate.id = Some(table.next_id);
        table.next_id += 1;
        table.rows.push(candidate.clone());
        Ok(candidate)
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Candidate>, StoreError> {
        Ok(lock(&self.table)?
            .rows
            .iter()
            .find(|c| c.account_id == Some(account_id))
            .cloned())
    }
}

/// Refresh-token ledger held in process memory
///
/// The mutex makes `revoke_if_active` a true compare-and-set.
#[derive(Default)]
pub struct InMemoryRefreshTokenLedger {
    rows: Mutex<HashMap<String, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows for `user_id` that are neither revoked nor expired
    pub fn active_count_for_user(&self, user_id: Uuid) -> usize {
        self.rows
            .lock()
            .map(|rows| {
                rows.values()
                    .filter(|r| r.user_id == user_id && !r.is_revoked && !r.is_expired())
                    .count()
            })
            .unwrap_or(0)
    }
}

#[async_trait]
impl RefreshTokenLedger for InMemoryRefreshTokenLedger {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        let mut rows = lock(&self.rows)?;
        if rows.contains_key(&record.token_hash) {
            return Err(StoreError::Duplicate("refresh token".to_string()));
        }
        rows.insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(lock(&self.rows)?.get(token_hash).cloned())
    }

    async fn revoke_if_active(&self, token_hash: &str) -> Result<bool, StoreError> {
        let mut rows = lock(&self.rows)?;
        match rows.get_mut(token_hash) {
            Some(record) if !record.is_revoked => {
                record.is_revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut rows = lock(&self.rows)?;
        let mut revoked = 0;
        for record in rows.values_mut() {
            if record.user_id == user_id && !record.is_revoked {
                record.is_revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revoke_if_active_succeeds_once() {
        let ledger = InMemoryRefreshTokenLedger::new();
        let record = RefreshTokenRecord::new("h".into(), "j".into(), Uuid::new_v4(), 7);
        ledger.insert(&record).await.unwrap();

        assert!(ledger.revoke_if_active("h").await.unwrap());
        assert!(!ledger.revoke_if_active("h").await.unwrap());
        assert!(!ledger.revoke_if_active("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_all_only_touches_one_user() {
        let ledger = InMemoryRefreshTokenLedger::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        for (hash, user) in [("a1", alice), ("a2", alice), ("b1", bob)] {
            let record = RefreshTokenRecord::new(hash.into(), "j".into(), user, 7);
            ledger.insert(&record).await.unwrap();
        }

        assert_eq!(ledger.revoke_all_for_user(alice).await.unwrap(), 2);
        assert_eq!(ledger.active_count_for_user(alice), 0);
        assert_eq!(ledger.active_count_for_user(bob), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryCredentialStore::new(PasswordPolicy {
            hash_cost: 4,
            ..PasswordPolicy::default()
        });
        let new_user = NewUser {
            email: "a@x.com".to_string(),
            role: crate::domain::UserRole::Company,
        };

        store.create(new_user.clone(), "ValidPassword1").await.unwrap();
        let second = store.create(new_user, "ValidPassword1").await;

        assert!(matches!(second, Err(StoreError::Duplicate(_))));
        assert_eq!(store.user_count(), 1);
    }
}
