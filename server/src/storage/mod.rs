//! Persistence collaborators.
//!
//! The core only talks to storage through `UserStore` and `NoteStore`. Every
//! call is one scoped operation: implementations acquire whatever handle they
//! need, and release it before returning on every path, including errors.
//!
//! # Invariants
//!
//! - Storage failures are reported as `StorageError` and never disguised as
//!   "not found".
//! - `NoteStore::find_by_id_and_owner` filters on both keys; a note owned by
//!   someone else is `Ok(None)`.

mod memory;

pub use memory::MemoryStore;

use crate::types::{Identifier, Note, Principal};

/// Errors raised by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A lock guarding the store was poisoned by a panicking writer.
    LockPoisoned,
    /// A uniqueness constraint was violated.
    Conflict(String),
    /// The backend could not be reached or failed mid-operation.
    Unavailable(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LockPoisoned => write!(f, "storage lock poisoned"),
            Self::Conflict(what) => write!(f, "uniqueness conflict: {what}"),
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Lookup and insertion of principals.
pub trait UserStore: Send + Sync {
    fn find_by_identifier(&self, id: &Identifier) -> Result<Option<Principal>, StorageError>;

    /// Exact, case-sensitive match on the stored email.
    fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StorageError>;

    /// # Errors
    /// Returns `StorageError::Conflict` if the email is already registered.
    fn insert(&self, principal: Principal) -> Result<Principal, StorageError>;
}

/// Owner-scoped access to notes.
pub trait NoteStore: Send + Sync {
    fn find_by_id_and_owner(
        &self,
        id: &Identifier,
        owner: &Identifier,
    ) -> Result<Option<Note>, StorageError>;

    /// Notes of `owner`, newest-created first.
    fn list_by_owner(
        &self,
        owner: &Identifier,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Note>, StorageError>;

    fn insert(&self, note: Note) -> Result<Note, StorageError>;

    /// Last write wins.
    fn update(&self, note: Note) -> Result<Note, StorageError>;

    fn delete(&self, note: &Note) -> Result<(), StorageError>;
}
