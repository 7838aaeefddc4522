//! Process Configuration
//! Mission: Load and validate environment-provided settings once at startup

use crate::auth::jwt::{DEFAULT_TTL, MIN_SECRET_LEN};
use std::env;
use std::time::Duration;
use tracing::{info, warn};

/// Development-only signing key used by the lenient profile.
const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";
const DEFAULT_DB_URL: &str = "learnsphere.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:8080";

/// Accepted bcrypt cost range.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Startup configuration errors. Any of these stops the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT signing key must be at least {minimum} characters (got {length})")]
    SigningKeyTooShort { length: usize, minimum: usize },
    #[error("required environment variables are not set: {}", .0.join(", "))]
    MissingRequired(Vec<String>),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Deployment profile selected by `APP_PROFILE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Missing settings fall back to defaults with a warning.
    Lenient,
    /// Missing secrets or database credentials abort startup.
    Strict,
}

impl Profile {
    fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("prod") {
            Profile::Strict
        } else {
            Profile::Lenient
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub profile: Profile,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub token_leeway_secs: u64,
    pub bcrypt_cost: u32,
    pub database: DatabaseConfig,
    pub cors_allowed_origins: Vec<String>,
    pub bind_addr: String,
    pub bootstrap_admin: Option<(String, String)>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let profile = Profile::from_name(&get("APP_PROFILE").unwrap_or_default());
        info!("Active profile: {:?}", profile);

        let mut missing = Vec::new();

        let db_url = get("DB_URL");
        let db_username = get("DB_USERNAME");
        let db_password = get("DB_PASSWORD");
        let jwt_secret = get("JWT_SECRET");

        for (name, value) in [
            ("DB_URL", &db_url),
            ("DB_USERNAME", &db_username),
            ("DB_PASSWORD", &db_password),
            ("JWT_SECRET", &jwt_secret),
        ] {
            match (value, profile) {
                (Some(_), _) => info!("{} configured", name),
                (None, Profile::Strict) => missing.push(name.to_string()),
                (None, Profile::Lenient) => warn!("{} not set (using default)", name),
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingRequired(missing));
        }

        let jwt_secret = jwt_secret.unwrap_or_else(|| {
            warn!("Using development JWT secret - NOT SECURE for production!");
            DEV_JWT_SECRET.to_string()
        });
        let length = jwt_secret.chars().count();
        if length < MIN_SECRET_LEN {
            return Err(ConfigError::SigningKeyTooShort {
                length,
                minimum: MIN_SECRET_LEN,
            });
        }

        let token_ttl = match get("JWT_EXPIRATION_MS") {
            Some(raw) => {
                // Token timestamps have whole-second resolution
                let millis: u64 = parse_number("JWT_EXPIRATION_MS", &raw)?;
                if millis < 1000 || millis % 1000 != 0 {
                    return Err(ConfigError::InvalidValue {
                        name: "JWT_EXPIRATION_MS".to_string(),
                        value: raw,
                    });
                }
                Duration::from_millis(millis)
            }
            None => DEFAULT_TTL,
        };
        let token_leeway_secs = match get("JWT_LEEWAY_SECS") {
            Some(raw) => parse_number("JWT_LEEWAY_SECS", &raw)?,
            None => 0,
        };

        let bcrypt_cost = match get("BCRYPT_COST") {
            Some(raw) => {
                let cost: u32 = parse_number("BCRYPT_COST", &raw)?;
                if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
                    return Err(ConfigError::InvalidValue {
                        name: "BCRYPT_COST".to_string(),
                        value: raw,
                    });
                }
                cost
            }
            None => bcrypt::DEFAULT_COST,
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let bootstrap_admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            (Some(_), None) | (None, Some(_)) => {
                warn!("ADMIN_EMAIL and ADMIN_PASSWORD must both be set; skipping admin bootstrap");
                None
            }
            (None, None) => None,
        };

        Ok(Self {
            profile,
            jwt_secret,
            token_ttl,
            token_leeway_secs,
            bcrypt_cost,
            database: DatabaseConfig {
                url: db_url.unwrap_or_else(|| DEFAULT_DB_URL.to_string()),
                username: db_username,
                password: db_password,
            },
            cors_allowed_origins,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            bootstrap_admin,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
    })
}
