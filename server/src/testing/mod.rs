//! Shared fixtures for unit and scenario tests.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::auth::{AuthConfig, PasswordConfig};
use crate::service::NotesService;
use crate::storage::{MemoryStore, NoteStore, StorageError, UserStore};
use crate::time::{ManualTimeSource, TimeSource};
use crate::types::{Identifier, Note, Principal};

pub const TEST_SECRET: &[u8] = b"notes-test-secret-key";

/// Default token lifetime used by test services.
pub const TEST_TTL: Duration = Duration::from_secs(60 * 60);

/// A store whose backend is always down.
pub struct UnavailableStore;

fn down<T>() -> Result<T, StorageError> {
    Err(StorageError::Unavailable("connection refused".to_string()))
}

impl UserStore for UnavailableStore {
    fn find_by_identifier(&self, _id: &Identifier) -> Result<Option<Principal>, StorageError> {
        down()
    }

    fn find_by_email(&self, _email: &str) -> Result<Option<Principal>, StorageError> {
        down()
    }

    fn insert(&self, _principal: Principal) -> Result<Principal, StorageError> {
        down()
    }
}

impl NoteStore for UnavailableStore {
    fn find_by_id_and_owner(
        &self,
        _id: &Identifier,
        _owner: &Identifier,
    ) -> Result<Option<Note>, StorageError> {
        down()
    }

    fn list_by_owner(
        &self,
        _owner: &Identifier,
        _limit: usize,
        _offset: usize,
    ) -> Result<Vec<Note>, StorageError> {
        down()
    }

    fn insert(&self, _note: Note) -> Result<Note, StorageError> {
        down()
    }

    fn update(&self, _note: Note) -> Result<Note, StorageError> {
        down()
    }

    fn delete(&self, _note: &Note) -> Result<(), StorageError> {
        down()
    }
}

/// A service over a fresh `MemoryStore`, a manual clock and cheap Argon2
/// parameters. Returns the clock so tests can move time.
pub fn new_test_service() -> (NotesService, Arc<ManualTimeSource>) {
    new_test_service_with_password(PasswordConfig::insecure_fast())
}

/// Like `new_test_service`, with the given Argon2 parameters.
#[allow(clippy::expect_used)]
pub fn new_test_service_with_password(
    password: PasswordConfig,
) -> (NotesService, Arc<ManualTimeSource>) {
    let store = Arc::new(MemoryStore::new());
    let shared_store = Arc::clone(&store);
    let users: Arc<dyn UserStore> = shared_store;
    let notes: Arc<dyn NoteStore> = store;
    let clock = Arc::new(ManualTimeSource::default_start());
    let shared_clock = Arc::clone(&clock);
    let time: Arc<dyn TimeSource> = shared_clock;
    let auth = AuthConfig::new(TEST_SECRET.to_vec(), Algorithm::HS256, Some(TEST_TTL))
        .expect("valid auth config");

    let service =
        NotesService::new(auth, password, users, notes, time).expect("valid password config");

    (service, clock)
}

/// A service whose storage backend is always down.
#[allow(clippy::expect_used)]
pub fn new_unavailable_service() -> NotesService {
    let auth = AuthConfig::new(TEST_SECRET.to_vec(), Algorithm::HS256, Some(TEST_TTL))
        .expect("valid auth config");
    NotesService::new(
        auth,
        PasswordConfig::insecure_fast(),
        Arc::new(UnavailableStore),
        Arc::new(UnavailableStore),
        Arc::new(ManualTimeSource::default_start()),
    )
    .expect("valid password config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NoteFields;

    #[test]
    fn test_one_store_backs_users_and_notes() {
        let (service, clock) = new_test_service();
        let alice = service.register("Alice", "a@x.com", "pw1").expect("register");
        let token = service.authenticate("a@x.com", "pw1").expect("login");
        let principal = service.authenticated_principal(&token).expect("resolve");
        assert_eq!(principal.id, alice.id);

        let note = service
            .create_resource(&principal, NoteFields::default())
            .expect("create");
        assert_eq!(note.created_at_ms, clock.now_ms());
        assert_eq!(
            service.list_owned_resources(&principal, 10, 0),
            Ok(vec![note])
        );
    }
}
