//! A [`LiveDocument`] over an editor buffer.
//!
//! The server cannot mutate the client's buffer directly. Edits are applied
//! to a local copy and recorded as LSP text edits, which the server then
//! sends back to the client in one `workspace/applyEdit` request.

use crate::conversions::to_lsp_range;
use gql_assist_patch::{
    DocumentError, EditError, EditFn, EditSession, LiveDocument, StagedEdit, TextBuffer,
};
use gql_assist_types::{Position, Range};
use lsp_types::TextEdit;

/// Snapshot of an open editor buffer that records what was done to it.
#[derive(Debug)]
pub struct EditorDocument {
    path: String,
    original: TextBuffer,
    buffer: TextBuffer,
    /// Edits of each committed session, in application order.
    sessions: Vec<Vec<TextEdit>>,
    saved: bool,
}

impl EditorDocument {
    #[must_use]
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        let buffer = TextBuffer::new(text);
        Self {
            path: path.into(),
            original: buffer.clone(),
            buffer,
            sessions: Vec::new(),
            saved: false,
        }
    }

    /// Whether the pipeline asked for the document to be saved.
    #[must_use]
    pub fn save_requested(&self) -> bool {
        self.saved
    }

    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.buffer.text() != self.original.text()
    }

    /// Edits turning the text the document was opened with into its
    /// current text, in the coordinates of the opening text.
    ///
    /// A single session is replayed edit by edit. Several sessions would
    /// need their coordinates rebased, so they collapse into one
    /// whole-document replacement.
    #[must_use]
    pub fn text_edits(&self) -> Vec<TextEdit> {
        if !self.is_modified() {
            return Vec::new();
        }
        match self.sessions.as_slice() {
            [only] => only.iter().rev().cloned().collect(),
            _ => vec![TextEdit::new(
                to_lsp_range(self.original.full_range()),
                self.buffer.text().to_string(),
            )],
        }
    }
}

impl LiveDocument for EditorDocument {
    fn path(&self) -> &str {
        &self.path
    }

    fn text(&self) -> &str {
        self.buffer.text()
    }

    fn edit(&mut self, f: EditFn<'_>) -> Result<(), DocumentError> {
        let mut session = RecordingSession {
            staged: StagedEdit::new(self.buffer.clone()),
            edits: Vec::new(),
        };
        f(&mut session)?;
        self.buffer = session.staged.into_buffer();
        self.sessions.push(session.edits);
        Ok(())
    }

    fn save(&mut self) -> Result<(), DocumentError> {
        self.saved = true;
        Ok(())
    }
}

/// Stages edits and keeps an LSP copy of each one that succeeded.
struct RecordingSession {
    staged: StagedEdit,
    edits: Vec<TextEdit>,
}

impl RecordingSession {
    fn record(&mut self, range: Range, text: &str) {
        self.edits.push(TextEdit::new(to_lsp_range(range), text.to_string()));
    }
}

impl EditSession for RecordingSession {
    fn insert(&mut self, at: Position, text: &str) -> Result<(), EditError> {
        self.staged.insert(at, text)?;
        self.record(Range::at(at), text);
        Ok(())
    }

    fn delete(&mut self, range: Range) -> Result<(), EditError> {
        self.staged.delete(range)?;
        self.record(range, "");
        Ok(())
    }

    fn replace(&mut self, range: Range, text: &str) -> Result<(), EditError> {
        self.staged.replace(range, text)?;
        self.record(range, text);
        Ok(())
    }

    fn full_range(&self) -> Range {
        self.staged.full_range()
    }

    fn discard(&mut self) {
        self.staged.discard();
        self.edits.clear();
    }
}
