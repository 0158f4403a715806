//! Backend faults surface as storage errors, never as auth outcomes.

use crate::service::ServiceError;
use crate::testing::new_unavailable_service;

#[test]
fn test_login_against_down_store() {
    let service = new_unavailable_service();
    assert!(matches!(
        service.authenticate("a@x.com", "pw"),
        Err(ServiceError::StorageUnavailable(_))
    ));
}

#[test]
fn test_registration_against_down_store() {
    let service = new_unavailable_service();
    assert!(matches!(
        service.register("Alice", "a@x.com", "pw"),
        Err(ServiceError::StorageUnavailable(_))
    ));
}

#[test]
fn test_invalid_token_is_rejected_before_storage() {
    let service = new_unavailable_service();
    assert_eq!(
        service.authenticated_principal("not-a-token"),
        Err(ServiceError::Unauthenticated)
    );
}
