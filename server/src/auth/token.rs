//! Session token issuance and validation.
//!
//! Tokens are HMAC-signed JWTs carrying a `sub` claim (the principal's
//! canonical identifier text) and an optional `exp` claim.
//!
//! # Pre-conditions
//! - The `AuthConfig` has a non-empty secret and an HMAC algorithm.
//!
//! # Post-conditions
//! - `validate` returns claims only after the signature and algorithm check
//!   has passed in full.
//! - A token without `exp` never expires through this mechanism.
//!
//! # Invariants
//! - Tokens are stateless; nothing is stored or revoked server side.
//! - Expiry is evaluated against the injected `TimeSource` with zero leeway.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::AuthConfig;
use crate::time::TimeSource;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject claim containing the principal identifier text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiry as seconds since Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Error returned when issuing or validating a token fails.
///
/// The variants exist for diagnostics. Callers must treat every validation
/// error as one "invalid token" outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The signature does not match the configured secret.
    InvalidSignature,
    /// The token header names a different algorithm.
    InvalidAlgorithm,
    /// The token is malformed or its claims cannot be parsed.
    MalformedToken,
    /// The `exp` claim is in the past.
    TokenExpired,
    /// Signing a new token failed.
    Signing(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "invalid token signature"),
            Self::InvalidAlgorithm => write!(f, "unexpected token algorithm"),
            Self::MalformedToken => write!(f, "malformed token"),
            Self::TokenExpired => write!(f, "token has expired"),
            Self::Signing(reason) => write!(f, "failed to sign token: {reason}"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issues and validates session tokens.
pub struct TokenService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn TimeSource>,
}

impl TokenService {
    #[must_use]
    pub fn new(config: AuthConfig, clock: Arc<dyn TimeSource>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret());
        let decoding_key = DecodingKey::from_secret(config.secret());

        // `exp` is optional and checked against our own clock after decoding.
        let mut validation = Validation::new(config.algorithm());
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
            clock,
        }
    }

    /// Issue a token for `subject`.
    ///
    /// # Arguments
    /// * `subject` - Canonical identifier text of the principal.
    /// * `ttl` - Lifetime of the token. `None` omits the `exp` claim.
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: Some(subject.to_string()),
            exp: ttl.map(|ttl| self.clock.now_secs().saturating_add(ttl.as_secs())),
        };
        let header = Header::new(self.config.algorithm());

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue a token using the configured default lifetime.
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_default(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, self.config.default_ttl())
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// Returns `TokenError` if the signature, algorithm or structure is bad,
    /// or if an `exp` claim is present and not in the future.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(map_jwt_error)?;
        let claims = token_data.claims;

        if claims.exp.is_some_and(|exp| self.clock.now_secs() >= exp) {
            return Err(TokenError::TokenExpired);
        }

        Ok(claims)
    }
}

/// Maps jsonwebtoken errors to our `TokenError` type.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => TokenError::InvalidAlgorithm,
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        _ => TokenError::MalformedToken,
    }
}
