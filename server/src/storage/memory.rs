//! In-memory store implementing both collaborator traits.
//!
//! # Thread Safety
//!
//! Users and notes each sit behind their own `RwLock`. Guards are taken per
//! call and dropped before the call returns, so no lock is ever held across
//! two operations. A poisoned lock surfaces as `StorageError::LockPoisoned`.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{NoteStore, StorageError, UserStore};
use crate::types::{Identifier, Note, Principal};

#[derive(Default)]
struct Users {
    by_id: HashMap<Identifier, Principal>,
    /// Email uniqueness index.
    by_email: HashMap<String, Identifier>,
}

/// A process-local store for principals and notes.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Users>,
    notes: RwLock<HashMap<Identifier, Note>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryStore {
    fn find_by_identifier(&self, id: &Identifier) -> Result<Option<Principal>, StorageError> {
        let users = self.users.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(users.by_id.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StorageError> {
        let users = self.users.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(users
            .by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    #[allow(clippy::significant_drop_tightening)] // The guard must cover both index updates
    fn insert(&self, principal: Principal) -> Result<Principal, StorageError> {
        let mut users = self.users.write().map_err(|_| StorageError::LockPoisoned)?;

        if users.by_email.contains_key(&principal.email) {
            return Err(StorageError::Conflict("email already registered".to_string()));
        }
        if users.by_id.contains_key(&principal.id) {
            return Err(StorageError::Conflict("user id already exists".to_string()));
        }

        users.by_email.insert(principal.email.clone(), principal.id);
        users.by_id.insert(principal.id, principal.clone());
        Ok(principal)
    }
}

impl NoteStore for MemoryStore {
    fn find_by_id_and_owner(
        &self,
        id: &Identifier,
        owner: &Identifier,
    ) -> Result<Option<Note>, StorageError> {
        let notes = self.notes.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(notes.get(id).filter(|note| note.owner == *owner).cloned())
    }

    fn list_by_owner(
        &self,
        owner: &Identifier,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Note>, StorageError> {
        let mut owned: Vec<Note> = {
            let notes = self.notes.read().map_err(|_| StorageError::LockPoisoned)?;
            notes
                .values()
                .filter(|note| note.owner == *owner)
                .cloned()
                .collect()
        };

        // Newest first; ties broken by id so paging is stable.
        owned.sort_by(|a, b| {
            b.created_at_ms
                .cmp(&a.created_at_ms)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(owned.into_iter().skip(offset).take(limit).collect())
    }

    fn insert(&self, note: Note) -> Result<Note, StorageError> {
        let mut notes = self.notes.write().map_err(|_| StorageError::LockPoisoned)?;
        if notes.contains_key(&note.id) {
            return Err(StorageError::Conflict("note id already exists".to_string()));
        }
        notes.insert(note.id, note.clone());
        Ok(note)
    }

    fn update(&self, note: Note) -> Result<Note, StorageError> {
        let mut notes = self.notes.write().map_err(|_| StorageError::LockPoisoned)?;
        // A concurrent delete wins: updating a vanished note is a no-op.
        if let Some(stored) = notes
            .get_mut(&note.id)
            .filter(|stored| stored.owner == note.owner)
        {
            *stored = note.clone();
        }
        Ok(note)
    }

    fn delete(&self, note: &Note) -> Result<(), StorageError> {
        let mut notes = self.notes.write().map_err(|_| StorageError::LockPoisoned)?;
        if notes.get(&note.id).is_some_and(|stored| stored.owner == note.owner) {
            notes.remove(&note.id);
        }
        Ok(())
    }
}
