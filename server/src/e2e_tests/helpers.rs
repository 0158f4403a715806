//! Common helpers for end-to-end tests.

use std::sync::Arc;
use std::time::Duration;

use crate::service::{NotesService, ServiceError};
use crate::testing::new_test_service;
use crate::time::ManualTimeSource;
use crate::types::{Note, NoteFields, NotePatch, Principal};

pub const ALICE_EMAIL: &str = "a@x.com";
pub const ALICE_PASSWORD: &str = "pw1";
pub const BOB_EMAIL: &str = "b@x.com";
pub const BOB_PASSWORD: &str = "pw2";

/// A service over a fresh store plus the clock that drives it.
pub struct TestClient {
    pub service: NotesService,
    pub clock: Arc<ManualTimeSource>,
}

/// A registered, logged-in principal.
pub struct Session {
    pub principal: Principal,
    pub token: String,
}

impl TestClient {
    #[must_use]
    pub fn new() -> Self {
        let (service, clock) = new_test_service();
        Self { service, clock }
    }

    /// Advance the clock.
    pub fn advance(&self, by: Duration) {
        self.clock
            .advance(u64::try_from(by.as_millis()).unwrap_or(u64::MAX));
    }

    /// Register and log in, panicking on failure.
    #[allow(clippy::expect_used)]
    pub fn sign_up(&self, name: &str, email: &str, password: &str) -> Session {
        let principal = self
            .service
            .register(name, email, password)
            .expect("registration should succeed");
        let token = self
            .service
            .authenticate(email, password)
            .expect("login should succeed");
        Session { principal, token }
    }

    pub fn alice(&self) -> Session {
        self.sign_up("Alice", ALICE_EMAIL, ALICE_PASSWORD)
    }

    pub fn bob(&self) -> Session {
        self.sign_up("Bob", BOB_EMAIL, BOB_PASSWORD)
    }

    /// Resolve the session's token the way every authenticated request does.
    pub fn whoami(&self, session: &Session) -> Result<Principal, ServiceError> {
        self.service.authenticated_principal(&session.token)
    }

    /// Create a note through a freshly resolved principal.
    #[allow(clippy::expect_used)]
    pub fn create_note(&self, session: &Session, title: &str, content: &str) -> Note {
        let principal = self.whoami(session).expect("token should resolve");
        self.service
            .create_resource(
                &principal,
                NoteFields {
                    title: Some(title.to_string()),
                    content: Some(content.to_string()),
                },
            )
            .expect("create should succeed")
    }

    pub fn get_note(&self, session: &Session, note_id: &str) -> Result<Note, ServiceError> {
        let principal = self.whoami(session)?;
        self.service.get_owned_resource(note_id, &principal)
    }

    pub fn update_note(
        &self,
        session: &Session,
        note_id: &str,
        patch: NotePatch,
    ) -> Result<Note, ServiceError> {
        let principal = self.whoami(session)?;
        self.service.update_owned_resource(note_id, &principal, patch)
    }

    pub fn delete_note(&self, session: &Session, note_id: &str) -> Result<(), ServiceError> {
        let principal = self.whoami(session)?;
        self.service.delete_owned_resource(note_id, &principal)
    }

    pub fn list_notes(
        &self,
        session: &Session,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Note>, ServiceError> {
        let principal = self.whoami(session)?;
        self.service.list_owned_resources(&principal, limit, offset)
    }
}
