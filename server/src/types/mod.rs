pub mod ids;
pub mod note;
pub mod principal;

pub use ids::{Identifier, IdentifierError, NormalizedHex};
pub use note::{Note, NoteFields, NotePatch};
pub use principal::Principal;
