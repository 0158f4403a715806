//! Recovers the authenticated principal from a session token.
//!
//! # Post-conditions
//! - On success, the returned principal exists in storage at the moment of
//!   resolution and its id matches the token's `sub` claim.
//!
//! # Invariants
//! - No caching: every call re-verifies the signature and re-queries storage.
//! - The token text is never logged.

use super::TokenService;
use crate::storage::{StorageError, UserStore};
use crate::types::{Identifier, Principal};

/// Why a token did not resolve to a principal.
///
/// `Unauthenticated`, `MalformedClaims` and `PrincipalNotFound` are for
/// internal diagnostics and collapse into one outcome at the boundary.
/// `Storage` is a backend fault and must stay distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The token failed signature, algorithm, structure or expiry checks.
    Unauthenticated,
    /// The `sub` claim is missing, empty or not a valid identifier.
    MalformedClaims,
    /// No principal exists for the `sub` claim.
    PrincipalNotFound,
    /// The user lookup failed.
    Storage(StorageError),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "token rejected"),
            Self::MalformedClaims => write!(f, "token claims are malformed"),
            Self::PrincipalNotFound => write!(f, "token subject does not exist"),
            Self::Storage(e) => write!(f, "user lookup failed: {e}"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(e) => Some(e),
            Self::Unauthenticated | Self::MalformedClaims | Self::PrincipalNotFound => None,
        }
    }
}

impl From<StorageError> for ResolveError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Resolves tokens to principals.
pub struct IdentityResolver<'a> {
    tokens: &'a TokenService,
    users: &'a dyn UserStore,
}

impl<'a> IdentityResolver<'a> {
    #[must_use]
    pub fn new(tokens: &'a TokenService, users: &'a dyn UserStore) -> Self {
        Self { tokens, users }
    }

    /// Resolve a token to the principal it was issued for.
    ///
    /// # Errors
    /// See `ResolveError`. Only `ResolveError::Storage` indicates a fault
    /// outside the caller's control.
    pub fn resolve(&self, token: &str) -> Result<Principal, ResolveError> {
        let claims = self.tokens.validate(token).map_err(|e| {
            tracing::debug!("token validation failed: {e}");
            ResolveError::Unauthenticated
        })?;

        let Some(subject) = claims.sub.filter(|sub| !sub.is_empty()) else {
            tracing::debug!("token has no subject claim");
            return Err(ResolveError::MalformedClaims);
        };

        let id = Identifier::parse(&subject).map_err(|_| {
            tracing::debug!("token subject is not a valid identifier");
            ResolveError::MalformedClaims
        })?;

        match self.users.find_by_identifier(&id)? {
            Some(principal) => Ok(principal),
            None => {
                tracing::debug!("token subject {id} has no principal");
                Err(ResolveError::PrincipalNotFound)
            }
        }
    }
}
