//! Token signing configuration.
//!
//! # Pre-conditions
//! - The signing secret must be non-empty.
//! - The algorithm must be one of the symmetric HMAC algorithms.
//!
//! # Post-conditions
//! - `AuthConfig` instances are immutable once created.
//!
//! # Invariants
//! - Rotating the secret invalidates every previously issued token.

use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Error returned when the auth configuration is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfigError {
    /// The signing secret is empty.
    EmptySecret,
    /// The algorithm is not a supported HMAC algorithm.
    UnsupportedAlgorithm(String),
}

impl std::fmt::Display for AuthConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySecret => write!(f, "signing secret must not be empty"),
            Self::UnsupportedAlgorithm(name) => {
                write!(f, "unsupported signing algorithm: {name}")
            }
        }
    }
}

impl std::error::Error for AuthConfigError {}

/// Process-wide token configuration, fixed at startup.
#[derive(Clone)]
pub struct AuthConfig {
    secret: Vec<u8>,
    algorithm: Algorithm,
    /// `None` issues tokens without an `exp` claim.
    default_ttl: Option<Duration>,
}

impl AuthConfig {
    /// Create a new auth configuration.
    ///
    /// # Pre-conditions
    /// - `secret` must not be empty.
    /// - `algorithm` must be HS256, HS384 or HS512.
    ///
    /// # Errors
    /// Returns `AuthConfigError::EmptySecret` if the secret is empty.
    /// Returns `AuthConfigError::UnsupportedAlgorithm` for non-HMAC algorithms.
    pub fn new(
        secret: Vec<u8>,
        algorithm: Algorithm,
        default_ttl: Option<Duration>,
    ) -> Result<Self, AuthConfigError> {
        if secret.is_empty() {
            return Err(AuthConfigError::EmptySecret);
        }
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthConfigError::UnsupportedAlgorithm(format!(
                "{algorithm:?}"
            )));
        }
        Ok(Self {
            secret,
            algorithm,
            default_ttl,
        })
    }

    /// Parse an algorithm identifier such as `"HS256"`.
    ///
    /// # Errors
    /// Returns `AuthConfigError::UnsupportedAlgorithm` for anything other than
    /// HS256, HS384 or HS512.
    pub fn parse_algorithm(name: &str) -> Result<Algorithm, AuthConfigError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(AuthConfigError::UnsupportedAlgorithm(name.to_string())),
        }
    }

    #[must_use]
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub const fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
