//! Application configuration

use std::env;
use std::str::FromStr;

use time::Duration;

use crate::auth::PasswordScheme;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub request_timeout_secs: u64,
    pub log_format: LogFormat,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Authentication
    pub jwt_secret: String,
    pub password_salt: String,
    pub password_scheme: PasswordScheme,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,

    // Refresh token cookie
    pub refresh_cookie: RefreshCookieConfig,

    // Project read cache
    pub project_cache_ttl_secs: u64,
}

/// Attributes of the cookie carrying the refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCookieConfig {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub max_age_secs: i64,
}

/// Values injected into the auth service at construction
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub signing_secret: String,
    pub password_salt: String,
    pub password_scheme: PasswordScheme,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::Invalid("LOG_FORMAT")),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_token_ttl_secs =
            positive("ACCESS_TOKEN_TTL_SECS", parse_or("ACCESS_TOKEN_TTL_SECS", 3600)?)?;
        let refresh_token_ttl_secs = positive(
            "REFRESH_TOKEN_TTL_SECS",
            parse_or("REFRESH_TOKEN_TTL_SECS", 30 * 24 * 3600)?,
        )?;

        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", 10)?,
            log_format: match env::var("LOG_FORMAT") {
                Ok(value) => value.parse()?,
                Err(_) => LogFormat::Pretty,
            },

            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,

            // Authentication
            jwt_secret: {
                let secret =
                    env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
                if secret.len() < 32 {
                    return Err(ConfigError::WeakSecret(
                        "JWT_SECRET must be at least 32 characters",
                    ));
                }
                secret
            },
            password_salt: {
                let salt =
                    env::var("PASSWORD_SALT").map_err(|_| ConfigError::Missing("PASSWORD_SALT"))?;
                if salt.is_empty() {
                    return Err(ConfigError::WeakSecret("PASSWORD_SALT must not be empty"));
                }
                salt
            },
            password_scheme: match env::var("PASSWORD_SCHEME") {
                Ok(value) => value
                    .parse()
                    .map_err(|_| ConfigError::Invalid("PASSWORD_SCHEME"))?,
                Err(_) => PasswordScheme::SaltedSha256,
            },
            access_token_ttl_secs,
            refresh_token_ttl_secs,

            // Refresh token cookie
            refresh_cookie: RefreshCookieConfig {
                name: env::var("REFRESH_COOKIE_NAME")
                    .unwrap_or_else(|_| "refresh-token".to_string()),
                path: env::var("REFRESH_COOKIE_PATH")
                    .unwrap_or_else(|_| "/api/v1/auth".to_string()),
                domain: env::var("REFRESH_COOKIE_DOMAIN").ok().filter(|d| !d.is_empty()),
                secure: parse_or("REFRESH_COOKIE_SECURE", true)?,
                http_only: parse_or("REFRESH_COOKIE_HTTP_ONLY", true)?,
                max_age_secs: refresh_token_ttl_secs,
            },

            // Project read cache
            project_cache_ttl_secs: parse_or("PROJECT_CACHE_TTL_SECS", 3600)?,
        })
    }

    /// Auth settings handed to [`crate::auth::AuthService`]
    pub fn auth(&self) -> AuthConfig {
        AuthConfig {
            signing_secret: self.jwt_secret.clone(),
            password_salt: self.password_salt.clone(),
            password_scheme: self.password_scheme,
            access_token_ttl: Duration::seconds(self.access_token_ttl_secs),
            refresh_token_ttl: Duration::seconds(self.refresh_token_ttl_secs),
        }
    }
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

fn positive(key: &'static str, value: i64) -> Result<i64, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::Invalid(key));
    }
    Ok(value)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Weak secret: {0}")]
    WeakSecret(&'static str),
    #[error("Invalid value for {0}")]
    Invalid(&'static str),
}
