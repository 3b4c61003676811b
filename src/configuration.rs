use crate::auth::PasswordPolicy;
use crate::error::ConfigError;

const MIN_SECRET_LENGTH: usize = 32;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub password: PasswordPolicy,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Token issuing settings, passed explicitly to the issuer and validator
#[derive(serde::Deserialize, Clone, Debug)]
pub struct JwtSettings {
    /// HMAC-SHA256 signing key
    pub secret: String,
    pub issuer: String,
    pub access_token_lifetime_minutes: i64,
    /// Length of the random part of a refresh token; a UUID suffix is appended
    pub refresh_token_length: usize,
    pub refresh_token_lifetime_days: i64,
}

impl JwtSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }
        if self.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }
        if self.refresh_token_length == 0 {
            return Err(ConfigError::InvalidValue(
                "jwt.refresh_token_length must be positive".to_string(),
            ));
        }
        if self.access_token_lifetime_minutes <= 0 || self.refresh_token_lifetime_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "token lifetimes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Access-token lifetime in seconds, as reported to clients
    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.access_token_lifetime_minutes * 60
    }
}

/// Reads `configuration.yaml` (optional) and `APP__`-prefixed environment
/// variables, e.g. `APP__JWT__SECRET`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
