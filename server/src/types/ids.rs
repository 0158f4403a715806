//! Identifier codec for users and notes.
//!
//! Every user and note is keyed by a 128-bit identifier. The binary form
//! (16 raw bytes) is the storage and comparison key; text forms only exist at
//! the edges (token claims, URLs, JSON bodies).
//!
//! # Accepted text forms
//!
//! - `3f2504e0-4f89-11d3-9a0c-0305e82c3301` (hyphenated)
//! - `3f2504e04f8911d39a0c0305e82c3301` (bare)
//! - `0x3f2504e04f8911d39a0c0305e82c3301`
//! - `{3f2504e0-4f89-11d3-9a0c-0305e82c3301}`
//! - `urn:uuid:3f2504e0-4f89-11d3-9a0c-0305e82c3301`
//!
//! Letter case and surrounding whitespace are ignored.
//!
//! # Invariants
//!
//! - Every accepted text form normalizes to exactly one binary value.
//! - The canonical text form is lowercase, hyphenated 8-4-4-4-12.

use std::fmt;

use uuid::Uuid;

/// Number of hex characters in a normalized identifier.
const HEX_LENGTH: usize = 32;

/// Error returned when a text identifier cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The text is not 32 hex characters after stripping decorations.
    InvalidFormat,
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "invalid identifier format"),
        }
    }
}

impl std::error::Error for IdentifierError {}

/// A validated, decoration-free identifier text.
///
/// # Invariants
///
/// - Exactly 32 characters, each in `[0-9a-f]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedHex(String);

impl NormalizedHex {
    /// Normalize a decorated identifier text.
    ///
    /// Strips surrounding whitespace, a `urn:uuid:` prefix, a leading `0x`,
    /// one pair of surrounding braces and all hyphens, then lower-cases.
    ///
    /// # Errors
    ///
    /// Returns `IdentifierError::InvalidFormat` if what remains is not exactly
    /// 32 hex characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use notes_server::types::NormalizedHex;
    /// let hex = NormalizedHex::normalize("{3F2504E0-4F89-11D3-9A0C-0305E82C3301}").unwrap();
    /// assert_eq!(hex.as_str(), "3f2504e04f8911d39a0c0305e82c3301");
    /// ```
    pub fn normalize(text: &str) -> Result<Self, IdentifierError> {
        let mut rest = text.trim();
        rest = strip_prefix_ignore_case(rest, "urn:uuid:").unwrap_or(rest);
        rest = strip_prefix_ignore_case(rest, "0x").unwrap_or(rest);
        if let Some(inner) = rest.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            rest = inner;
        }

        let hex: String = rest
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        if hex.len() != HEX_LENGTH || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(IdentifierError::InvalidFormat);
        }

        Ok(Self(hex))
    }

    /// The normalized 32-character text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode into the 16-byte binary form.
    #[must_use]
    pub fn to_binary(&self) -> [u8; 16] {
        let digits = self.0.as_bytes();
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (nibble(digits[2 * i]) << 4) | nibble(digits[2 * i + 1]);
        }
        bytes
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Value of a single lowercase hex digit. Input is pre-validated.
const fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        _ => digit - b'a' + 10,
    }
}

/// A 128-bit identifier for a principal or a note.
///
/// Wraps a 16-byte array. The inner field is public to allow direct access
/// to the bytes for storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identifier(pub [u8; 16]);

impl Identifier {
    /// Generate a new random (version 4) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }

    /// Parse any accepted text form.
    ///
    /// # Errors
    ///
    /// Returns `IdentifierError::InvalidFormat` if the text cannot be normalized.
    pub fn parse(text: &str) -> Result<Self, IdentifierError> {
        NormalizedHex::normalize(text).map(|hex| Self(hex.to_binary()))
    }

    /// Canonical lowercase hyphenated text.
    #[must_use]
    pub fn to_text(&self) -> String {
        Uuid::from_bytes(self.0).hyphenated().to_string()
    }

    /// Get the underlying byte array.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Uuid::from_bytes(self.0).hyphenated())
    }
}

impl From<[u8; 16]> for Identifier {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl From<Identifier> for [u8; 16] {
    fn from(id: Identifier) -> Self {
        id.0
    }
}
