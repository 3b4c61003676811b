use chrono::NaiveDate;
use uuid::Uuid;

/// File content already read into memory by the upload layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl Attachment {
    /// Stores `content` under a generated `<prefix>_<uuid><ext>` name
    pub fn renamed(prefix: &str, original_name: &str, content: Vec<u8>) -> Self {
        Self {
            file_name: generate_file_name(prefix, original_name),
            content,
        }
    }
}

/// Builds a collision-free file name that keeps the original extension.
pub fn generate_file_name(prefix: &str, original_name: &str) -> String {
    let extension = std::path::Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    format!("{}_{}{}", prefix, Uuid::new_v4(), extension)
}

#[derive(Debug, Clone, Default)]
pub struct Company {
    /// Assigned by the repository on insert
    pub id: Option<i64>,
    /// Owning account, linked during registration
    pub account_id: Option<Uuid>,
    pub name: String,
    pub address: String,
    pub description: String,
    pub contact_number: Option<String>,
    pub category: Option<String>,
    pub logo: Option<Attachment>,
}

#[derive(Debug, Clone, Default)]
pub struct Candidate {
    pub id: Option<i64>,
    pub account_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub gender: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub resume: Option<Attachment>,
    pub photo: Option<Attachment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_file_name_keeps_extension() {
        let name = generate_file_name("photo", "me.final.png");
        assert!(name.starts_with("photo_"));
        assert!(name.ends_with(".png"));
        // prefix + '_' + hyphenated uuid + ".png"
        assert_eq!(name.len(), "photo_".len() + 36 + ".png".len());
    }

    #[test]
    fn test_generated_file_name_without_extension() {
        let name = generate_file_name("resume", "cv");
        assert_eq!(name.len(), "resume_".len() + 36);
    }

    #[test]
    fn test_generated_names_are_unique() {
        assert_ne!(
            generate_file_name("logo", "a.jpg"),
            generate_file_name("logo", "a.jpg")
        );
    }
}
