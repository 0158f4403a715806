//! End-to-end tests at the service entry-point level.
//!
//! Each test file covers a specific scenario, driving the same calls the
//! HTTP layer makes against an in-memory store and a manual clock.

#![cfg(test)]

mod helpers;

mod test_concurrent_registration;
mod test_list_notes;
mod test_note_lifecycle;
mod test_note_ownership;
mod test_partial_update;
mod test_register_login;
mod test_storage_unavailable;
mod test_token_expiry;
mod test_token_tampering;
