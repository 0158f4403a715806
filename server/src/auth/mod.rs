//! Authentication module.
//!
//! Password hashing, session tokens, and token-to-principal resolution.
//!
//! # Pre-conditions
//! - The signing secret and Argon2 parameters are fixed at startup.
//!
//! # Post-conditions
//! - Authentication configuration is immutable once loaded.
//!
//! # Invariants
//! - Tokens, secrets and password material are never logged.

pub mod config;
pub mod password;
pub mod resolver;
pub mod token;

pub use config::{AuthConfig, AuthConfigError};
pub use password::{CredentialStore, PasswordConfig, PasswordError};
pub use resolver::{IdentityResolver, ResolveError};
pub use token::{Claims, TokenError, TokenService};
