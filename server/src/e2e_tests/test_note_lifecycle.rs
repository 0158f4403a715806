//! Create, read, update and delete a note as its owner.

use crate::e2e_tests::helpers::TestClient;
use crate::service::ServiceError;
use crate::types::{NoteFields, NotePatch};

#[test]
fn test_full_lifecycle() {
    let client = TestClient::new();
    let alice = client.alice();

    let note = client.create_note(&alice, "Title", "Body");
    assert_eq!(note.owner, alice.principal.id);
    assert_eq!(note.created_at_ms, note.updated_at_ms);

    let id = note.id.to_text();
    assert_eq!(client.get_note(&alice, &id), Ok(note.clone()));

    let updated = client
        .update_note(
            &alice,
            &id,
            NotePatch {
                title: Some(Some("New title".to_string())),
                content: Some(Some("New body".to_string())),
            },
        )
        .expect("update");
    assert_eq!(updated.id, note.id);
    assert_eq!(client.get_note(&alice, &id), Ok(updated));

    client.delete_note(&alice, &id).expect("delete");
    assert_eq!(client.get_note(&alice, &id), Err(ServiceError::NotFound));
    assert_eq!(client.delete_note(&alice, &id), Err(ServiceError::NotFound));
}

#[test]
fn test_note_without_fields() {
    let client = TestClient::new();
    let alice = client.alice();
    let principal = client.whoami(&alice).expect("resolve");

    let note = client
        .service
        .create_resource(&principal, NoteFields::default())
        .expect("create");
    assert_eq!(note.title, None);
    assert_eq!(note.content, None);
}

#[test]
fn test_update_missing_note_is_not_found() {
    let client = TestClient::new();
    let alice = client.alice();

    assert_eq!(
        client.update_note(
            &alice,
            &crate::types::Identifier::generate().to_text(),
            NotePatch::default()
        ),
        Err(ServiceError::NotFound)
    );
}
