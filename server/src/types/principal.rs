//! The authenticated user.

use super::Identifier;

/// A registered user.
///
/// # Invariants
///
/// - `email` is unique across all principals.
/// - `password_hash` is a PHC-formatted Argon2 digest, never plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Identifier,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    /// Milliseconds since Unix epoch.
    pub created_at_ms: u64,
    /// Milliseconds since Unix epoch.
    pub updated_at_ms: u64,
}

// Hand-written so the password hash never ends up in logs.
impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at_ms", &self.created_at_ms)
            .field("updated_at_ms", &self.updated_at_ms)
            .finish()
    }
}
