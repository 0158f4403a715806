//! Server configuration module.
//!
//! This module provides configuration loading for the notes server from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `NOTES_SECRET_KEY`: Token signing secret (required)
//! - `NOTES_JWT_ALGORITHM`: `HS256`, `HS384` or `HS512` (default: `HS256`)
//! - `NOTES_TOKEN_TTL_MINUTES`: Token lifetime in minutes (default: `10080`);
//!   `0`, `none` or `never` issues tokens without expiry
//! - `NOTES_LISTEN_PORT`: Port to listen on (default: `8000`)
//! - `NOTES_ARGON2_MEMORY_KIB`, `NOTES_ARGON2_ITERATIONS`,
//!   `NOTES_ARGON2_PARALLELISM`: Argon2id cost (default: Argon2 recommended)
//!
//! # Invariants
//!
//! - `auth` always holds a non-empty secret and an HMAC algorithm
//! - Configuration is read once at startup; there is no hot reload

use std::time::Duration;

use crate::auth::{AuthConfig, PasswordConfig};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub auth: AuthConfig,
    pub password: PasswordConfig,
    /// Port to listen on for HTTP connections.
    pub listen_port: u16,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

const SECRET_KEY: &str = "NOTES_SECRET_KEY";
const JWT_ALGORITHM: &str = "NOTES_JWT_ALGORITHM";
const TOKEN_TTL_MINUTES: &str = "NOTES_TOKEN_TTL_MINUTES";
const LISTEN_PORT: &str = "NOTES_LISTEN_PORT";
const ARGON2_MEMORY_KIB: &str = "NOTES_ARGON2_MEMORY_KIB";
const ARGON2_ITERATIONS: &str = "NOTES_ARGON2_ITERATIONS";
const ARGON2_PARALLELISM: &str = "NOTES_ARGON2_PARALLELISM";

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 8000;
    /// Default token lifetime: seven days.
    pub const DEFAULT_TOKEN_TTL_MINUTES: u64 = 60 * 24 * 7;
    /// Default signing algorithm.
    pub const DEFAULT_ALGORITHM: &'static str = "HS256";

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `NOTES_SECRET_KEY` is not set or is empty
    /// - any optional variable is set to an unparseable value
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as `from_env`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup(SECRET_KEY)
            .ok_or_else(|| ConfigError::MissingEnvVar(SECRET_KEY.to_string()))?;

        let algorithm_name =
            lookup(JWT_ALGORITHM).unwrap_or_else(|| Self::DEFAULT_ALGORITHM.to_string());
        let algorithm =
            AuthConfig::parse_algorithm(&algorithm_name).map_err(|e| ConfigError::InvalidValue {
                name: JWT_ALGORITHM.to_string(),
                message: e.to_string(),
            })?;

        let ttl = match lookup(TOKEN_TTL_MINUTES) {
            Some(value) => parse_ttl_minutes(&value)?,
            None => Some(Duration::from_secs(Self::DEFAULT_TOKEN_TTL_MINUTES * 60)),
        };

        let auth = AuthConfig::new(secret.into_bytes(), algorithm, ttl).map_err(|e| {
            ConfigError::InvalidValue {
                name: SECRET_KEY.to_string(),
                message: e.to_string(),
            }
        })?;

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: parse_or(&lookup, ARGON2_MEMORY_KIB, defaults.memory_kib)?,
            iterations: parse_or(&lookup, ARGON2_ITERATIONS, defaults.iterations)?,
            parallelism: parse_or(&lookup, ARGON2_PARALLELISM, defaults.parallelism)?,
        };

        let listen_port = match lookup(LISTEN_PORT) {
            Some(value) => parse_port(&value)?,
            None => Self::DEFAULT_PORT,
        };

        Ok(Self {
            auth,
            password,
            listen_port,
        })
    }
}

/// Parse a token lifetime. `0`, `none` and `never` disable expiry.
fn parse_ttl_minutes(value: &str) -> Result<Option<Duration>, ConfigError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("never") {
        return Ok(None);
    }
    let minutes = trimmed.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
        name: TOKEN_TTL_MINUTES.to_string(),
        message: format!("'{value}' is not a number of minutes"),
    })?;
    Ok((minutes > 0).then(|| Duration::from_secs(minutes.saturating_mul(60))))
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidValue {
            name: LISTEN_PORT.to_string(),
            message: format!("'{value}' is not a valid port number (must be 1-65535)"),
        }),
    }
}

fn parse_or(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u32,
) -> Result<u32, ConfigError> {
    lookup(name).map_or(Ok(default), |value| {
        value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("'{value}' is not a non-negative integer"),
        })
    })
}
