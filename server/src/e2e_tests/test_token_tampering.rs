//! Tokens that were not issued by this service never resolve.

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use crate::auth::Claims;
use crate::e2e_tests::helpers::TestClient;
use crate::service::ServiceError;
use crate::testing::TEST_SECRET;

fn forge(secret: &[u8], algorithm: Algorithm, sub: &str) -> String {
    let claims = Claims {
        sub: Some(sub.to_string()),
        exp: None,
    };
    encode(&Header::new(algorithm), &claims, &EncodingKey::from_secret(secret))
        .expect("encode")
}

#[test]
fn test_foreign_secret_is_rejected() {
    let client = TestClient::new();
    let alice = client.alice();

    let forged = forge(b"some-other-secret", Algorithm::HS256, &alice.principal.id.to_text());
    assert_eq!(
        client.service.authenticated_principal(&forged),
        Err(ServiceError::Unauthenticated)
    );
}

#[test]
fn test_other_algorithm_is_rejected() {
    let client = TestClient::new();
    let alice = client.alice();

    let forged = forge(TEST_SECRET, Algorithm::HS512, &alice.principal.id.to_text());
    assert_eq!(
        client.service.authenticated_principal(&forged),
        Err(ServiceError::Unauthenticated)
    );
}

#[test]
fn test_subject_swap_breaks_signature() {
    let client = TestClient::new();
    let alice = client.alice();
    let bob = client.bob();

    // Splice Bob's payload onto Alice's signature.
    let alice_parts: Vec<&str> = alice.token.split('.').collect();
    let bob_parts: Vec<&str> = bob.token.split('.').collect();
    let spliced = format!("{}.{}.{}", alice_parts[0], bob_parts[1], alice_parts[2]);

    assert_eq!(
        client.service.authenticated_principal(&spliced),
        Err(ServiceError::Unauthenticated)
    );
}

#[test]
fn test_valid_token_for_unknown_principal_is_rejected() {
    let client = TestClient::new();
    client.alice();

    let orphan = forge(
        TEST_SECRET,
        Algorithm::HS256,
        &crate::types::Identifier::generate().to_text(),
    );
    assert_eq!(
        client.service.authenticated_principal(&orphan),
        Err(ServiceError::Unauthenticated)
    );
}

#[test]
fn test_garbage_is_rejected() {
    let client = TestClient::new();
    for token in ["", "abc", "a.b.c", "...."] {
        assert_eq!(
            client.service.authenticated_principal(token),
            Err(ServiceError::Unauthenticated),
            "token: {token:?}"
        );
    }
}
