//! Password hashing with Argon2id.
//!
//! Digests are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! the salt and cost parameters travel with the digest and verification does
//! not depend on the current configuration.
//!
//! The store also keeps a decoy digest made with the configured parameters.
//! Logins for an unknown email verify against it so they cost the same as a
//! wrong password.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;

/// Salt length in bytes.
const SALT_LENGTH: usize = 16;

/// Plaintext behind the decoy digest. Never compared for equality.
const DECOY_PLAINTEXT: &str = "no-such-principal";

/// Error returned when hashing fails or parameters are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// The Argon2 cost parameters are out of range.
    InvalidParams(String),
    /// Hashing itself failed.
    Hashing(String),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParams(reason) => write!(f, "invalid argon2 parameters: {reason}"),
            Self::Hashing(reason) => write!(f, "password hashing failed: {reason}"),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl PasswordConfig {
    /// Cheapest parameters Argon2 accepts. Only for tests.
    #[must_use]
    pub const fn insecure_fast() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes and verifies passwords.
pub struct CredentialStore {
    argon2: Argon2<'static>,
    decoy: String,
}

impl CredentialStore {
    /// # Errors
    /// Returns `PasswordError::InvalidParams` if Argon2 rejects the parameters
    /// and `PasswordError::Hashing` if the decoy digest cannot be made.
    pub fn new(config: PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        let mut store = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: String::new(),
        };
        store.decoy = store.hash(DECOY_PLAINTEXT)?;
        Ok(store)
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Post-conditions
    /// - Hashing the same plaintext twice yields different digests.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let mut salt_bytes = [0u8; SALT_LENGTH];
        rand::rng().fill(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        let digest = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        Ok(digest.to_string())
    }

    /// Check a plaintext against a stored digest.
    ///
    /// The comparison is constant-time. A digest that cannot be parsed is
    /// treated as a mismatch.
    #[must_use]
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Run a full verification against the decoy digest and reject.
    ///
    /// # Post-conditions
    /// - Always returns `false`, whatever the plaintext.
    #[must_use]
    pub fn verify_decoy(&self, plaintext: &str) -> bool {
        let _ = std::hint::black_box(self.verify(plaintext, &self.decoy));
        false
    }
}
