#![cfg_attr(test, allow(clippy::disallowed_methods, clippy::expect_used))]
// Life of a request:
// 1. HTTP request comes in
// 2. Extract the bearer token, resolve it to a principal
//     - Verify signature, algorithm and expiry
//     - Decode the `sub` claim into an identifier
//     - Look the principal up in storage
// 3. For note operations:
//     - Decode the note id
//     - Look up by (note id, principal id) together
//     - Apply the operation, respond
//
// System components:
//  - Identifier codec
//  - Credential store (Argon2id)
//  - Token service (HMAC-signed JWT)
//  - Identity resolver
//  - Ownership gate

pub mod auth;
pub mod config;
pub mod http;
pub mod notes;
pub mod service;
pub mod storage;
pub mod time;
pub mod types;

mod e2e_tests;
#[cfg(test)]
mod testing;
