//! Concurrent registrations of the same email: exactly one wins.

use std::sync::{Arc, Barrier};
use std::thread;

use crate::e2e_tests::helpers::TestClient;
use crate::service::ServiceError;

#[test]
fn test_only_one_registration_wins() {
    const THREADS: usize = 8;

    let client = Arc::new(TestClient::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let client = Arc::clone(&client);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                client
                    .service
                    .register(&format!("Racer {i}"), "race@x.com", "pw")
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let losers = results
        .iter()
        .filter(|r| matches!(r, Err(ServiceError::EmailTaken)))
        .count();

    assert_eq!(winners, 1);
    assert_eq!(losers, THREADS - 1);
}

#[test]
fn test_concurrent_note_creation() {
    const THREADS: usize = 8;

    let client = Arc::new(TestClient::new());
    let alice = Arc::new(client.alice());

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let client = Arc::clone(&client);
            let alice = Arc::clone(&alice);
            thread::spawn(move || client.create_note(&alice, &format!("note {i}"), ""))
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread");
    }

    assert_eq!(client.list_notes(&alice, 50, 0).expect("list").len(), THREADS);
}
