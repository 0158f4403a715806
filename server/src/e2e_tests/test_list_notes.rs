//! Listing a principal's notes.

use std::time::Duration;

use crate::e2e_tests::helpers::TestClient;

#[test]
fn test_no_notes_is_an_empty_list() {
    let client = TestClient::new();
    let alice = client.alice();

    assert_eq!(client.list_notes(&alice, 50, 0), Ok(Vec::new()));
}

#[test]
fn test_newest_first_with_paging() {
    let client = TestClient::new();
    let alice = client.alice();

    for title in ["first", "second", "third", "fourth"] {
        client.create_note(&alice, title, "");
        client.advance(Duration::from_millis(10));
    }

    let titles = |notes: Vec<crate::types::Note>| -> Vec<String> {
        notes.into_iter().filter_map(|n| n.title).collect()
    };

    let all = client.list_notes(&alice, 50, 0).expect("list");
    assert_eq!(titles(all), vec!["fourth", "third", "second", "first"]);

    let page = client.list_notes(&alice, 2, 1).expect("list");
    assert_eq!(titles(page), vec!["third", "second"]);

    let past_end = client.list_notes(&alice, 2, 10).expect("list");
    assert!(past_end.is_empty());
}

#[test]
fn test_deleted_notes_leave_the_list() {
    let client = TestClient::new();
    let alice = client.alice();

    let keep = client.create_note(&alice, "keep", "");
    let drop = client.create_note(&alice, "drop", "");
    client
        .delete_note(&alice, &drop.id.to_text())
        .expect("delete");

    let notes = client.list_notes(&alice, 50, 0).expect("list");
    assert_eq!(notes, vec![keep]);
}
