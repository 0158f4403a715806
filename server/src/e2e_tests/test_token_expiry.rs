//! Token lifetime against a simulated clock.

use std::time::Duration;

use crate::e2e_tests::helpers::{ALICE_EMAIL, ALICE_PASSWORD, TestClient};
use crate::service::ServiceError;
use crate::testing::TEST_TTL;

#[test]
fn test_token_expires_after_default_ttl() {
    let client = TestClient::new();
    let alice = client.alice();

    client.advance(TEST_TTL - Duration::from_secs(1));
    assert!(client.whoami(&alice).is_ok());

    client.advance(Duration::from_secs(1));
    assert_eq!(client.whoami(&alice), Err(ServiceError::Unauthenticated));

    // A fresh login works again.
    let token = client
        .service
        .authenticate(ALICE_EMAIL, ALICE_PASSWORD)
        .expect("login");
    assert_eq!(
        client.service.authenticated_principal(&token),
        Ok(alice.principal)
    );
}

#[test]
fn test_expired_token_cannot_reach_notes() {
    let client = TestClient::new();
    let alice = client.alice();
    let note = client.create_note(&alice, "t", "c");

    client.advance(TEST_TTL + Duration::from_secs(60));
    assert_eq!(
        client.get_note(&alice, &note.id.to_text()),
        Err(ServiceError::Unauthenticated)
    );
    assert_eq!(
        client.list_notes(&alice, 50, 0),
        Err(ServiceError::Unauthenticated)
    );
}
