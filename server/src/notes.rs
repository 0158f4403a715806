//! Owner-scoped note access.
//!
//! A note that exists but belongs to someone else is indistinguishable from
//! one that does not exist, and a malformed id is indistinguishable from both.
//! Callers cannot use lookups to enumerate other users' notes.
//!
//! # Invariants
//! - Every lookup filters on both the note id and the requester's id.
//! - Storage faults are never reported as `NotFound`.

use crate::storage::{NoteStore, StorageError};
use crate::types::{Identifier, Note, NotePatch, Principal};

/// Error returned by the ownership gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// Malformed id, absent note, or a note owned by another principal.
    NotFound,
    /// The note lookup failed.
    Storage(StorageError),
}

impl std::fmt::Display for GateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "note not found"),
            Self::Storage(e) => write!(f, "note lookup failed: {e}"),
        }
    }
}

impl std::error::Error for GateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(e) => Some(e),
            Self::NotFound => None,
        }
    }
}

impl From<StorageError> for GateError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

pub struct OwnershipGate<'a> {
    notes: &'a dyn NoteStore,
}

impl<'a> OwnershipGate<'a> {
    #[must_use]
    pub fn new(notes: &'a dyn NoteStore) -> Self {
        Self { notes }
    }

    /// Fetch a note only if `principal` owns it.
    ///
    /// # Errors
    /// Returns `GateError::NotFound` for a malformed id, a missing note, or a
    /// note owned by someone else. Returns `GateError::Storage` if the lookup
    /// itself fails.
    pub fn fetch_owned(&self, note_id: &str, principal: &Principal) -> Result<Note, GateError> {
        let Ok(id) = Identifier::parse(note_id) else {
            tracing::debug!("rejected malformed note id for {}", principal.id);
            return Err(GateError::NotFound);
        };

        self.notes
            .find_by_id_and_owner(&id, &principal.id)?
            .ok_or_else(|| {
                tracing::debug!("note {id} not visible to {}", principal.id);
                GateError::NotFound
            })
    }
}

/// Apply a partial update.
///
/// Present fields overwrite, including with the empty string or null. Absent
/// fields are left untouched. The modification timestamp is always bumped.
#[must_use]
pub fn apply_partial_update(mut note: Note, patch: NotePatch, now_ms: u64) -> Note {
    if let Some(title) = patch.title {
        note.title = title;
    }
    if let Some(content) = patch.content {
        note.content = content;
    }
    note.updated_at_ms = now_ms.max(note.created_at_ms);
    note
}
