//! Password Hashing and Verification
//!
//! bcrypt hashing behind a configurable strength policy. Policy violations
//! are collected, not short-circuited, so a caller sees every problem at once.

use bcrypt::{hash, verify, DEFAULT_COST};
use serde::Deserialize;

use crate::error::{StoreError, ValidationError};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    /// bcrypt work factor
    pub hash_cost: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            hash_cost: DEFAULT_COST,
        }
    }
}

impl PasswordPolicy {
    /// Every rule the password breaks
    pub fn violations(&self, password: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let length = password.chars().count();

        if length < self.min_length {
            errors.push(ValidationError::TooShort("password".to_string(), self.min_length));
        }
        // bcrypt limitation and DoS prevention
        if length > self.max_length {
            errors.push(ValidationError::TooLong("password".to_string(), self.max_length));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(ValidationError::Missing(
                "password must contain at least one digit".to_string(),
            ));
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            errors.push(ValidationError::Missing(
                "password must contain at least one lowercase letter".to_string(),
            ));
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            errors.push(ValidationError::Missing(
                "password must contain at least one uppercase letter".to_string(),
            ));
        }

        errors
    }
}

/// Hash a password after checking it against `policy`
///
/// # Errors
/// `StoreError::Rejected` listing every policy violation, or
/// `StoreError::Database` if bcrypt itself fails
pub fn hash_password(password: &str, policy: &PasswordPolicy) -> Result<String, StoreError> {
    let violations = policy.violations(password);
    if !violations.is_empty() {
        return Err(StoreError::Rejected(
            violations.iter().map(ToString::to_string).collect(),
        ));
    }

    hash(password, policy.hash_cost)
        .map_err(|e| StoreError::Database(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, StoreError> {
    verify(password, hash)
        .map_err(|e| StoreError::Database(format!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy() -> PasswordPolicy {
        PasswordPolicy {
            hash_cost: 4,
            ..PasswordPolicy::default()
        }
    }

    #[test]
    fn test_hash_password() {
        let password = "ValidPassword123";
        let hash = hash_password(password, &fast_policy()).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("ValidPassword123", &fast_policy()).unwrap();

        assert!(verify_password("ValidPassword123", &hash).unwrap());
        assert!(!verify_password("WrongPassword123", &hash).unwrap());
    }

    #[test]
    fn test_too_short_password() {
        let result = hash_password("Short1", &fast_policy());
        assert!(matches!(result, Err(StoreError::Rejected(_))));
    }

    #[test]
    fn test_too_long_password() {
        let long_password = "a".repeat(129) + "A1";
        assert!(hash_password(&long_password, &fast_policy()).is_err());
    }

    #[test]
    fn test_all_violations_reported() {
        let errors = fast_policy().violations("abc");
        // too short, no digit, no uppercase
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_missing_character_classes() {
        let policy = fast_policy();
        assert_eq!(policy.violations("NoDigitsPassword").len(), 1);
        assert_eq!(policy.violations("NOLOWERCASE1").len(), 1);
        assert_eq!(policy.violations("nouppercase1").len(), 1);
        assert!(policy.violations("ValidPassword123").is_empty());
    }

    #[test]
    fn test_relaxed_policy() {
        let policy = PasswordPolicy {
            min_length: 5,
            require_uppercase: false,
            hash_cost: 4,
            ..PasswordPolicy::default()
        };
        assert!(hash_password("pw123", &policy).is_ok());
    }
}
