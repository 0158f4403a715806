//! Notes and the inputs that create or modify them.

use super::Identifier;

/// A note owned by exactly one principal.
///
/// # Invariants
///
/// - `owner` never changes after creation.
/// - `updated_at_ms >= created_at_ms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: Identifier,
    pub owner: Identifier,
    pub title: Option<String>,
    pub content: Option<String>,
    /// Milliseconds since Unix epoch.
    pub created_at_ms: u64,
    /// Milliseconds since Unix epoch.
    pub updated_at_ms: u64,
}

/// Fields supplied when creating a note. Absent fields are stored as null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFields {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// A partial update.
///
/// The outer `Option` is presence: `None` means the field was absent and is
/// left untouched. `Some(None)` clears the field and `Some(Some(""))`
/// overwrites it with the empty string.
#[allow(clippy::option_option)] // null and absent mean different things
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<Option<String>>,
    pub content: Option<Option<String>>,
}

impl NotePatch {
    /// A patch that sets the title and leaves the content alone.
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(Some(title.into())),
            content: None,
        }
    }

    /// A patch that sets the content and leaves the title alone.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(Some(content.into())),
        }
    }
}
