//! Entry points exposed to the boundary layer.
//!
//! `NotesService` composes the credential store, token service, identity
//! resolver and ownership gate over the storage collaborators. It is the only
//! place internal failure kinds are translated into the collapsed kinds the
//! caller may see.
//!
//! # Invariants
//! - Login failures never reveal whether the email exists.
//! - Token failures never reveal which stage rejected the token.
//! - Note lookups never reveal whether a note exists for someone else.
//! - Storage faults are always reported as `StorageUnavailable`.

use std::sync::Arc;

use crate::auth::{
    AuthConfig, CredentialStore, IdentityResolver, PasswordConfig, PasswordError, ResolveError,
    TokenService,
};
use crate::notes::{GateError, OwnershipGate, apply_partial_update};
use crate::storage::{NoteStore, StorageError, UserStore};
use crate::time::TimeSource;
use crate::types::{Identifier, Note, NoteFields, NotePatch, Principal};

/// Longest accepted display name, in characters.
pub const MAX_NAME_CHARS: usize = 150;
/// Longest accepted email, in characters.
pub const MAX_EMAIL_CHARS: usize = 255;
/// Longest accepted note title, in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// Error returned to the boundary layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Unknown email or wrong password.
    InvalidCredentials,
    /// The email is already registered.
    EmailTaken,
    /// The token is missing, invalid, expired, malformed or orphaned.
    Unauthenticated,
    /// The note is absent, not owned by the caller, or the id is malformed.
    NotFound,
    /// A request field failed validation.
    InvalidInput(String),
    /// A storage collaborator failed.
    StorageUnavailable(String),
    /// Hashing or signing failed.
    Internal(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "incorrect email or password"),
            Self::EmailTaken => write!(f, "email already registered"),
            Self::Unauthenticated => write!(f, "not authenticated"),
            Self::NotFound => write!(f, "note not found"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::StorageUnavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::Internal(reason) => write!(f, "internal error: {reason}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        tracing::error!("storage failure: {e}");
        Self::StorageUnavailable(e.to_string())
    }
}

impl From<ResolveError> for ServiceError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Storage(e) => e.into(),
            ResolveError::Unauthenticated
            | ResolveError::MalformedClaims
            | ResolveError::PrincipalNotFound => Self::Unauthenticated,
        }
    }
}

impl From<GateError> for ServiceError {
    fn from(e: GateError) -> Self {
        match e {
            GateError::NotFound => Self::NotFound,
            GateError::Storage(e) => e.into(),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(e: PasswordError) -> Self {
        tracing::error!("password hashing failure: {e}");
        Self::Internal(e.to_string())
    }
}

/// The identity and note-ownership core.
pub struct NotesService {
    credentials: CredentialStore,
    tokens: TokenService,
    users: Arc<dyn UserStore>,
    notes: Arc<dyn NoteStore>,
    clock: Arc<dyn TimeSource>,
}

impl NotesService {
    /// # Errors
    /// Returns `PasswordError::InvalidParams` if the Argon2 parameters are rejected.
    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
    pub fn new(
        auth: AuthConfig,
        password: PasswordConfig,
        users: Arc<dyn UserStore>,
        notes: Arc<dyn NoteStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, PasswordError> {
        Ok(Self {
            credentials: CredentialStore::new(password)?,
            tokens: TokenService::new(auth, Arc::clone(&clock)),
            users,
            notes,
            clock,
        })
    }

    /// Check credentials and issue a session token with the default lifetime.
    ///
    /// # Errors
    /// Returns `ServiceError::InvalidCredentials` for an unknown email or a
    /// wrong password; the two are indistinguishable, including in how long
    /// they take.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        let Some(principal) = self.users.find_by_email(email)? else {
            // Same Argon2 cost as a wrong password.
            let _ = self.credentials.verify_decoy(password);
            tracing::debug!("login rejected");
            return Err(ServiceError::InvalidCredentials);
        };

        if !self.credentials.verify(password, &principal.password_hash) {
            tracing::debug!("login rejected");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue_default(&principal.id.to_text())
            .map_err(|e| {
                tracing::error!("token signing failure: {e}");
                ServiceError::Internal(e.to_string())
            })?;

        tracing::info!("issued session token for {}", principal.id);
        Ok(token)
    }

    /// Register a new principal.
    ///
    /// # Errors
    /// Returns `ServiceError::InvalidInput` for an empty name or password, a
    /// malformed email or an over-long name or email, and
    /// `ServiceError::EmailTaken` if the email exists.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Principal, ServiceError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidInput("user_name must not be empty".to_string()));
        }
        check_length("user_name", name, MAX_NAME_CHARS)?;
        if !is_plausible_email(email) {
            return Err(ServiceError::InvalidInput("user_email is not a valid email".to_string()));
        }
        check_length("user_email", email, MAX_EMAIL_CHARS)?;
        if password.is_empty() {
            return Err(ServiceError::InvalidInput("password must not be empty".to_string()));
        }

        if self.users.find_by_email(email)?.is_some() {
            return Err(ServiceError::EmailTaken);
        }

        let now_ms = self.clock.now_ms();
        let principal = Principal {
            id: Identifier::generate(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: self.credentials.hash(password)?,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        };

        // The store re-checks uniqueness; a concurrent registration loses here.
        let principal = self.users.insert(principal).map_err(|e| match e {
            StorageError::Conflict(_) => ServiceError::EmailTaken,
            other => other.into(),
        })?;

        tracing::info!("registered principal {}", principal.id);
        Ok(principal)
    }

    /// Resolve a session token to its principal.
    ///
    /// # Errors
    /// Returns `ServiceError::Unauthenticated` for every token problem and
    /// `ServiceError::StorageUnavailable` if the user lookup fails.
    pub fn authenticated_principal(&self, token: &str) -> Result<Principal, ServiceError> {
        let resolver = IdentityResolver::new(&self.tokens, self.users.as_ref());
        Ok(resolver.resolve(token)?)
    }

    pub fn get_owned_resource(
        &self,
        note_id: &str,
        principal: &Principal,
    ) -> Result<Note, ServiceError> {
        Ok(self.gate().fetch_owned(note_id, principal)?)
    }

    /// Notes of `principal`, newest first. No notes is an empty list, not an error.
    pub fn list_owned_resources(
        &self,
        principal: &Principal,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Note>, ServiceError> {
        Ok(self.notes.list_by_owner(&principal.id, limit, offset)?)
    }

    pub fn create_resource(
        &self,
        principal: &Principal,
        fields: NoteFields,
    ) -> Result<Note, ServiceError> {
        if let Some(title) = &fields.title {
            check_length("note_title", title, MAX_TITLE_CHARS)?;
        }
        let now_ms = self.clock.now_ms();
        let note = Note {
            id: Identifier::generate(),
            owner: principal.id,
            title: fields.title,
            content: fields.content,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        };

        let note = self.notes.insert(note)?;
        tracing::debug!("created note {} for {}", note.id, principal.id);
        Ok(note)
    }

    pub fn update_owned_resource(
        &self,
        note_id: &str,
        principal: &Principal,
        patch: NotePatch,
    ) -> Result<Note, ServiceError> {
        let note = self.gate().fetch_owned(note_id, principal)?;
        if let Some(Some(title)) = &patch.title {
            check_length("note_title", title, MAX_TITLE_CHARS)?;
        }
        let updated = apply_partial_update(note, patch, self.clock.now_ms());
        Ok(self.notes.update(updated)?)
    }

    pub fn delete_owned_resource(
        &self,
        note_id: &str,
        principal: &Principal,
    ) -> Result<(), ServiceError> {
        let note = self.gate().fetch_owned(note_id, principal)?;
        self.notes.delete(&note)?;
        tracing::debug!("deleted note {} for {}", note.id, principal.id);
        Ok(())
    }

    fn gate(&self) -> OwnershipGate<'_> {
        OwnershipGate::new(self.notes.as_ref())
    }
}

fn check_length(field: &str, value: &str, max_chars: usize) -> Result<(), ServiceError> {
    if value.chars().count() > max_chars {
        return Err(ServiceError::InvalidInput(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}

/// A single `@` with a non-empty local part and a dotted domain.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
