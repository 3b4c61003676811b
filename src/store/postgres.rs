use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{CandidateRepository, CompanyRepository, CredentialStore, RefreshTokenLedger};
use crate::auth::{hash_password, verify_password, PasswordPolicy};
use crate::domain::{Attachment, Candidate, Company, NewUser, RefreshTokenRecord, User};
use crate::error::StoreError;

fn attachment(content: Option<Vec<u8>>, file_name: Option<String>) -> Option<Attachment> {
    match (content, file_name) {
        (Some(content), Some(file_name)) => Some(Attachment { file_name, content }),
        _ => None,
    }
}

/// Credential store backed by the `users` table
pub struct PgCredentialStore {
    pool: PgPool,
    policy: PasswordPolicy,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool, policy: PasswordPolicy) -> Self {
        Self { pool, policy }
    }

    fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
        let role: String = row.try_get("role")?;
        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: role.parse().map_err(StoreError::Database)?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::user_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::user_from_row).transpose()
    }

    async fn check_password(&self, user: &User, password: &str) -> Result<bool, StoreError> {
        verify_password(password, &user.password_hash)
    }

    async fn create(&self, user: NewUser, password: &str) -> Result<User, StoreError> {
        let password_hash = hash_password(password, &self.policy)?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, password_hash, role, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&password_hash)
        .bind(user.role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Self::user_from_row(&row)
    }

    async fn delete(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {}", user.id)));
        }
        Ok(())
    }
}

pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    async fn add_company(&self, mut company: Company) -> Result<Company, StoreError> {
        let account_id = company
            .account_id
            .ok_or_else(|| StoreError::Database("company has no linked account".to_string()))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO companies
                (account_id, name, address, description, contact_number, category, logo_file, logo_file_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(account_id)
        .bind(&company.name)
        .bind(&company.address)
        .bind(&company.description)
        .bind(&company.contact_number)
        .bind(&company.category)
        .bind(company.logo.as_ref().map(|a| a.content.clone()))
        .bind(company.logo.as_ref().map(|a| a.file_name.clone()))
        .fetch_one(&self.pool)
        .await?;

        company.id = Some(id);
        Ok(company)
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Company>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, name, address, description, contact_number, category,
                   logo_file, logo_file_name
            FROM companies
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Company {
            id: row.try_get("id")?,
            account_id: row.try_get("account_id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            description: row.try_get("description")?,
            contact_number: row.try_get("contact_number")?,
            category: row.try_get("category")?,
            logo: attachment(row.try_get("logo_file")?, row.try_get("logo_file_name")?),
        }))
    }
}

pub struct PgCandidateRepository {
    pool: PgPool,
}

impl PgCandidateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateRepository for PgCandidateRepository {
    async fn add_candidate(&self, mut candidate: Candidate) -> Result<Candidate, StoreError> {
        let account_id = candidate
            .account_id
            .ok_or_else(|| StoreError::Database("candidate has no linked account".to_string()))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO candidates
                (account_id, first_name, last_name, address, gender, birthdate,
                 resume_file, resume_file_name, photo_file, photo_file_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(account_id)
        .bind(&candidate.first_name)
        .bind(&candidate.last_name)
        .bind(&candidate.address)
        .bind(&candidate.gender)
        .bind(candidate.birthdate)
        .bind(candidate.resume.as_ref().map(|a| a.content.clone()))
        .bind(candidate.resume.as_ref().map(|a| a.file_name.clone()))
        .bind(candidate.photo.as_ref().map(|a| a.content.clone()))
        .bind(candidate.photo.as_ref().map(|a| a.file_name.clone()))
        .fetch_one(&self.pool)
        .await?;

        candidate.id = Some(id);
        Ok(candidate)
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Candidate>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, first_name, last_name, address, gender, birthdate,
                   resume_file, resume_file_name, photo_file, photo_file_name
            FROM candidates
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Candidate {
            id: row.try_get("id")?,
            account_id: row.try_get("account_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            address: row.try_get("address")?,
            gender: row.try_get("gender")?,
            birthdate: row.try_get("birthdate")?,
            resume: attachment(row.try_get("resume_file")?, row.try_get("resume_file_name")?),
            photo: attachment(row.try_get("photo_file")?, row.try_get("photo_file_name")?),
        }))
    }
}

/// Refresh-token ledger backed by the `refresh_tokens` table
pub struct PgRefreshTokenLedger {
    pool: PgPool,
}

impl PgRefreshTokenLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenLedger for PgRefreshTokenLedger {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_hash, jwt_id, user_id, is_revoked, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&record.token_hash)
        .bind(&record.jwt_id)
        .bind(record.user_id)
        .bind(record.is_revoked)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT token_hash, jwt_id, user_id, is_revoked, created_at, expires_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(RefreshTokenRecord {
            token_hash: row.try_get("token_hash")?,
            jwt_id: row.try_get("jwt_id")?,
            user_id: row.try_get("user_id")?,
            is_revoked: row.try_get("is_revoked")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
        }))
    }

    async fn revoke_if_active(&self, token_hash: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = true, revoked_at = $1
            WHERE token_hash = $2 AND is_revoked = false
            "#,
        )
        .bind(Utc::now())
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = true, revoked_at = $1
            WHERE user_id = $2 AND is_revoked = false
            "#,
        )
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
