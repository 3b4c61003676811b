//! Domain types shared by the authentication core and its stores.

mod profile;
mod refresh_token;
mod user;

pub use profile::{generate_file_name, Attachment, Candidate, Company};
pub use refresh_token::RefreshTokenRecord;
pub use user::{NewUser, User, UserRole};
