//! JWT claim set
//!
//! Standard claims (RFC 7519) plus the account role and a role-dependent
//! snapshot of the linked profile.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Candidate, Company, User, UserRole};
use crate::error::AuthError;

/// Profile data embedded in the access token; binary attachments are left out
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SessionProfile {
    Company(CompanySnapshot),
    Candidate(CandidateSnapshot),
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub address: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_file_name: Option<String>,
}

impl From<&Company> for CompanySnapshot {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id,
            name: company.name.clone(),
            address: company.address.clone(),
            description: company.description.clone(),
            contact_number: company.contact_number.clone(),
            category: company.category.clone(),
            logo_file_name: company.logo.as_ref().map(|a| a.file_name.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_file_name: Option<String>,
}

impl From<&Candidate> for CandidateSnapshot {
    fn from(candidate: &Candidate) -> Self {
        Self {
            id: candidate.id,
            first_name: candidate.first_name.clone(),
            last_name: candidate.last_name.clone(),
            address: candidate.address.clone(),
            gender: candidate.gender.clone(),
            birthdate: candidate.birthdate,
            resume_file_name: candidate.resume.as_ref().map(|a| a.file_name.clone()),
            photo_file_name: candidate.photo.as_ref().map(|a| a.file_name.clone()),
        }
    }
}

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    /// Unique token id; the refresh token issued alongside stores it
    pub jti: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
    #[serde(default)]
    pub info: SessionProfile,
}

impl Claims {
    /// Builds claims for `user` with a fresh random `jti`
    pub fn new(user: &User, info: SessionProfile, lifetime_minutes: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            jti: Uuid::new_v4().to_string(),
            exp: now + lifetime_minutes * 60,
            iat: now,
            iss: issuer,
            info,
        }
    }

    /// Extract user ID from claims
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::InvalidToken)
    }

    pub fn is_expired(&self) -> bool {
        self.exp < chrono::Utc::now().timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Attachment;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            password_hash: String::new(),
            role,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_claims_creation() {
        let user = user(UserRole::Candidate);
        let claims = Claims::new(&user, SessionProfile::None, 15, "test".to_string());

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.role, UserRole::Candidate);
        assert_eq!(claims.exp - claims.iat, 900);
        assert!(!claims.is_expired());
        assert_eq!(claims.user_id().unwrap(), user.id);
    }

    #[test]
    fn test_each_claim_set_gets_its_own_jti() {
        let user = user(UserRole::Company);
        let a = Claims::new(&user, SessionProfile::None, 15, "test".to_string());
        let b = Claims::new(&user, SessionProfile::None, 15, "test".to_string());
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_invalid_user_id() {
        let mut claims = Claims::new(&user(UserRole::Company), SessionProfile::None, 15, "t".into());
        claims.sub = "invalid-uuid".to_string();
        assert!(claims.user_id().is_err());
    }

    #[test]
    fn test_company_snapshot_drops_file_content() {
        let company = Company {
            id: Some(4),
            name: "Acme".to_string(),
            logo: Some(Attachment {
                file_name: "logo_1.png".to_string(),
                content: vec![1, 2, 3],
            }),
            ..Company::default()
        };

        let profile = SessionProfile::Company(CompanySnapshot::from(&company));
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["kind"], "company");
        assert_eq!(json["name"], "Acme");
        assert_eq!(json["logo_file_name"], "logo_1.png");
        assert!(json.get("content").is_none());
        assert!(json.get("contact_number").is_none());
    }

    #[test]
    fn test_missing_info_defaults_to_none() {
        let user = user(UserRole::Candidate);
        let claims = Claims::new(&user, SessionProfile::None, 15, "t".into());
        let mut json = serde_json::to_value(&claims).unwrap();
        json.as_object_mut().unwrap().remove("info");

        let parsed: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.info, SessionProfile::None);
    }
}
