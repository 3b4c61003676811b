//! Refresh Token Values
//!
//! Refresh tokens are:
//! - A random alphanumeric string of configurable length plus a UUID suffix,
//!   so two tokens minted in the same instant can never collide
//! - Hashed with SHA-256 before they reach the ledger (never stored in plaintext)
//! - Single-use: redeeming one revokes it (see `AuthService::refresh_token`)

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a new refresh token value (what the client stores)
pub fn generate_refresh_token(length: usize) -> String {
    let random: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();

    format!("{}{}", random, Uuid::new_v4().simple())
}

/// Ledger key for a refresh token value
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token(23);

        // random part + 32 hex chars of the UUID
        assert_eq!(token.len(), 23 + 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_token_hashing() {
        let token = generate_refresh_token(23);
        let hash1 = hash_refresh_token(&token);
        let hash2 = hash_refresh_token(&token);

        assert_eq!(hash1, hash2);
        assert_ne!(token, hash1);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_tokens_different_hashes() {
        let hash1 = hash_refresh_token(&generate_refresh_token(23));
        let hash2 = hash_refresh_token(&generate_refresh_token(23));

        assert_ne!(hash1, hash2);
    }
}
