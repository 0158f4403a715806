//! A note owned by someone else is indistinguishable from a missing one.

use crate::e2e_tests::helpers::TestClient;
use crate::service::ServiceError;
use crate::types::{Identifier, NotePatch};

#[test]
fn test_foreign_note_is_not_found() {
    let client = TestClient::new();
    let alice = client.alice();
    let bob = client.bob();

    let note = client.create_note(&alice, "Alice's", "secret");
    let note_id = note.id.to_text();

    let foreign = client.get_note(&bob, &note_id);
    let random = client.get_note(&bob, &Identifier::generate().to_text());
    let malformed = client.get_note(&bob, "zzzz");

    assert_eq!(foreign, Err(ServiceError::NotFound));
    assert_eq!(foreign, random);
    assert_eq!(random, malformed);
}

#[test]
fn test_foreign_note_cannot_be_updated_or_deleted() {
    let client = TestClient::new();
    let alice = client.alice();
    let bob = client.bob();

    let note = client.create_note(&alice, "Alice's", "secret");
    let note_id = note.id.to_text();

    let patch = NotePatch::title("pwned");
    assert_eq!(
        client.update_note(&bob, &note_id, patch),
        Err(ServiceError::NotFound)
    );
    assert_eq!(client.delete_note(&bob, &note_id), Err(ServiceError::NotFound));

    // Untouched for the owner.
    assert_eq!(client.get_note(&alice, &note_id), Ok(note));
}

#[test]
fn test_owner_can_use_any_id_decoration() {
    let client = TestClient::new();
    let alice = client.alice();
    let note = client.create_note(&alice, "t", "c");

    let canonical = note.id.to_text();
    let bare = canonical.replace('-', "");
    let decorated = [
        canonical.clone(),
        canonical.to_uppercase(),
        bare.clone(),
        format!("{{{canonical}}}"),
        format!("urn:uuid:{canonical}"),
        format!("0x{bare}"),
    ];

    for id in decorated {
        assert_eq!(client.get_note(&alice, &id), Ok(note.clone()), "id: {id}");
    }
}

#[test]
fn test_lists_are_isolated_per_owner() {
    let client = TestClient::new();
    let alice = client.alice();
    let bob = client.bob();

    client.create_note(&alice, "a1", "");
    client.create_note(&alice, "a2", "");
    client.create_note(&bob, "b1", "");

    let alice_notes = client.list_notes(&alice, 50, 0).expect("list");
    let bob_notes = client.list_notes(&bob, 50, 0).expect("list");

    assert_eq!(alice_notes.len(), 2);
    assert!(alice_notes.iter().all(|n| n.owner == alice.principal.id));
    assert_eq!(bob_notes.len(), 1);
    assert_eq!(bob_notes[0].owner, bob.principal.id);
}
