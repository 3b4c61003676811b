use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// One row of the refresh-token ledger
///
/// `token_hash` is the SHA-256 digest of the value handed to the client.
/// `jwt_id` binds the row to the access token issued alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub jwt_id: String,
    pub user_id: Uuid,
    pub is_revoked: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(token_hash: String, jwt_id: String, user_id: Uuid, lifetime_days: i64) -> Self {
        let now = Utc::now();
        Self {
            token_hash,
            jwt_id,
            user_id,
            is_revoked: false,
            created_at: now,
            expires_at: now + Duration::days(lifetime_days),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_active() {
        let record = RefreshTokenRecord::new("hash".into(), "jti".into(), Uuid::new_v4(), 7);
        assert!(!record.is_revoked);
        assert!(!record.is_expired());
        assert_eq!((record.expires_at - record.created_at).num_days(), 7);
    }

    #[test]
    fn test_negative_lifetime_is_expired() {
        let record = RefreshTokenRecord::new("hash".into(), "jti".into(), Uuid::new_v4(), -1);
        assert!(record.is_expired());
    }
}
