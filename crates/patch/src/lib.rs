//! Safe application of generated text to live editor documents.
//!
//! The user may be typing in a document while a generator rewrites it. Rather
//! than replacing the whole buffer, [`PatchApplier`] diffs the current text
//! against the generated one and applies the resulting [`EditAction`]s inside
//! a single edit session, so unrelated regions (and the cursor) are left
//! alone. When the patch cannot be applied cleanly the session falls back to a
//! whole-content replace, which is always correct if less polite.
//!
//! [`EditAction`]: gql_assist_types::EditAction

mod applier;
mod buffer;
mod diff;
mod document;
mod error;

pub use applier::{apply_edit_actions, PatchApplier, PatchOutcome};
pub use buffer::{StagedEdit, TextBuffer};
pub use diff::{decode_actions, LineDiff, LineDiffer};
pub use document::{EditFn, EditSession, LiveDocument, MemoryDocument};
pub use error::{DocumentError, EditError, PatchError, Result};
