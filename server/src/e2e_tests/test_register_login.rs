//! Registration, duplicate registration, and login outcomes.

use crate::e2e_tests::helpers::{ALICE_EMAIL, ALICE_PASSWORD, TestClient};
use crate::service::ServiceError;

#[test]
fn test_register_then_login_resolves_to_same_principal() {
    let client = TestClient::new();
    let alice = client.alice();

    let resolved = client.whoami(&alice).expect("token should resolve");
    assert_eq!(resolved, alice.principal);
    assert_eq!(resolved.name, "Alice");
    assert_eq!(resolved.email, ALICE_EMAIL);
}

#[test]
fn test_duplicate_registration_is_email_taken() {
    let client = TestClient::new();
    client.alice();

    let result = client
        .service
        .register("Another Alice", ALICE_EMAIL, "different");
    assert_eq!(result, Err(ServiceError::EmailTaken));

    // The original credentials still work.
    assert!(client.service.authenticate(ALICE_EMAIL, ALICE_PASSWORD).is_ok());
    assert_eq!(
        client.service.authenticate(ALICE_EMAIL, "different"),
        Err(ServiceError::InvalidCredentials)
    );
}

#[test]
fn test_wrong_password_and_unknown_email_look_the_same() {
    let client = TestClient::new();
    client.alice();

    let wrong_password = client.service.authenticate(ALICE_EMAIL, "wrong");
    let unknown_email = client.service.authenticate("nobody@x.com", ALICE_PASSWORD);

    assert_eq!(wrong_password, Err(ServiceError::InvalidCredentials));
    assert_eq!(wrong_password, unknown_email);
}

#[test]
fn test_each_login_issues_a_working_token() {
    let client = TestClient::new();
    let alice = client.alice();

    client.advance(std::time::Duration::from_secs(1));
    let second = client
        .service
        .authenticate(ALICE_EMAIL, ALICE_PASSWORD)
        .expect("login");

    assert_eq!(
        client.service.authenticated_principal(&second),
        Ok(alice.principal.clone())
    );
    assert_eq!(client.whoami(&alice), Ok(alice.principal));
}
