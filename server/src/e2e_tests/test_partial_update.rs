//! Partial updates keep absent fields and overwrite present ones, where an
//! explicit null clears the field.

use std::time::Duration;

use crate::e2e_tests::helpers::TestClient;
use crate::types::NotePatch;

#[test]
fn test_title_only_update_keeps_content() {
    let client = TestClient::new();
    let alice = client.alice();
    let note = client.create_note(&alice, "Groceries", "milk, eggs");

    client.advance(Duration::from_secs(5));
    let updated = client
        .update_note(
            &alice,
            &note.id.to_text(),
            NotePatch::title("Shopping"),
        )
        .expect("update");

    assert_eq!(updated.title.as_deref(), Some("Shopping"));
    assert_eq!(updated.content.as_deref(), Some("milk, eggs"));
    assert_eq!(updated.created_at_ms, note.created_at_ms);
    assert_eq!(updated.updated_at_ms, note.created_at_ms + 5_000);
}

#[test]
fn test_empty_content_overwrites() {
    let client = TestClient::new();
    let alice = client.alice();
    let note = client.create_note(&alice, "Groceries", "milk, eggs");

    client
        .update_note(
            &alice,
            &note.id.to_text(),
            NotePatch::content(""),
        )
        .expect("update");

    let stored = client.get_note(&alice, &note.id.to_text()).expect("get");
    assert_eq!(stored.title.as_deref(), Some("Groceries"));
    assert_eq!(stored.content.as_deref(), Some(""));
}

#[test]
fn test_empty_patch_changes_nothing_but_timestamp() {
    let client = TestClient::new();
    let alice = client.alice();
    let note = client.create_note(&alice, "Groceries", "milk, eggs");

    client.advance(Duration::from_secs(1));
    let updated = client
        .update_note(&alice, &note.id.to_text(), NotePatch::default())
        .expect("update");

    assert_eq!(updated.title, note.title);
    assert_eq!(updated.content, note.content);
    assert!(updated.updated_at_ms > note.updated_at_ms);
}

#[test]
fn test_explicit_null_clears_and_omitted_keeps() {
    let client = TestClient::new();
    let alice = client.alice();
    let note = client.create_note(&alice, "Groceries", "milk, eggs");

    client
        .update_note(
            &alice,
            &note.id.to_text(),
            NotePatch {
                title: None,
                content: Some(None),
            },
        )
        .expect("update");

    let stored = client.get_note(&alice, &note.id.to_text()).expect("get");
    assert_eq!(stored.title.as_deref(), Some("Groceries"));
    assert_eq!(stored.content, None);

    client
        .update_note(
            &alice,
            &note.id.to_text(),
            NotePatch {
                title: Some(None),
                content: None,
            },
        )
        .expect("update");

    let stored = client.get_note(&alice, &note.id.to_text()).expect("get");
    assert_eq!(stored.title, None);
    assert_eq!(stored.content, None);
}
