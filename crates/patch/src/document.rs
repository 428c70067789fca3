//! The editing surface the applier works against.

use crate::{DocumentError, EditError, StagedEdit, TextBuffer};
use gql_assist_types::{Position, Range};

/// The body of one edit session.
///
/// Returning `Err` from it abandons the session; nothing it staged is kept.
pub type EditFn<'a> = &'a mut dyn FnMut(&mut dyn EditSession) -> Result<(), EditError>;

/// Mutations staged inside one edit session of a [`LiveDocument`].
///
/// Positions are in the coordinates of the text as it stands after the
/// edits already made in this session.
pub trait EditSession {
    fn insert(&mut self, at: Position, text: &str) -> Result<(), EditError>;

    fn delete(&mut self, range: Range) -> Result<(), EditError>;

    fn replace(&mut self, range: Range, text: &str) -> Result<(), EditError>;

    /// Start of the first line to end of the last line of the staged text.
    fn full_range(&self) -> Range;

    /// Drop everything staged so far in this session.
    fn discard(&mut self);
}

/// A document open in the host, possibly being edited by the user.
pub trait LiveDocument: Send {
    fn path(&self) -> &str;

    /// Current full text.
    fn text(&self) -> &str;

    /// Run `f` inside one edit session; its edits land atomically if it
    /// returns `Ok`.
    fn edit(&mut self, f: EditFn<'_>) -> Result<(), DocumentError>;

    fn save(&mut self) -> Result<(), DocumentError>;
}

/// A document held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    path: String,
    buffer: TextBuffer,
    saves: usize,
    closed: bool,
}

impl MemoryDocument {
    #[must_use]
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            buffer: TextBuffer::new(text),
            saves: 0,
            closed: false,
        }
    }

    /// How many times [`LiveDocument::save`] succeeded.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Make every later edit session and save fail.
    pub fn close(&mut self) {
        self.closed = true;
    }

    fn ensure_open(&self) -> Result<(), DocumentError> {
        if self.closed {
            Err(DocumentError::Closed(self.path.clone()))
        } else {
            Ok(())
        }
    }
}

impl LiveDocument for MemoryDocument {
    fn path(&self) -> &str {
        &self.path
    }

    fn text(&self) -> &str {
        self.buffer.text()
    }

    fn edit(&mut self, f: EditFn<'_>) -> Result<(), DocumentError> {
        self.ensure_open()?;
        let mut staged = StagedEdit::new(self.buffer.clone());
        f(&mut staged)?;
        self.buffer = staged.into_buffer();
        Ok(())
    }

    fn save(&mut self) -> Result<(), DocumentError> {
        self.ensure_open()?;
        self.saves += 1;
        Ok(())
    }
}
