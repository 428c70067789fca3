use crate::{EngineError, Result};
use gql_assist_patch::{DocumentError, EditFn, LiveDocument, StagedEdit, TextBuffer};
use std::path::{Path, PathBuf};

/// A document backed by a file on disk, for hosts without an editor buffer.
///
/// Edits stay in memory until [`LiveDocument::save`] writes them out.
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
    display: String,
    buffer: TextBuffer,
}

impl FileDocument {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|source| EngineError::Read {
            path: path.clone(),
            source,
        })?;
        Ok(Self::with_text(path, text))
    }

    /// A document for `path` holding `text`, without touching the disk.
    #[must_use]
    pub fn with_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            display: path.to_string_lossy().into_owned(),
            path,
            buffer: TextBuffer::new(text),
        }
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.path
    }
}

impl LiveDocument for FileDocument {
    fn path(&self) -> &str {
        &self.display
    }

    fn text(&self) -> &str {
        self.buffer.text()
    }

    fn edit(&mut self, f: EditFn<'_>) -> std::result::Result<(), DocumentError> {
        let mut staged = StagedEdit::new(self.buffer.clone());
        f(&mut staged)?;
        self.buffer = staged.into_buffer();
        Ok(())
    }

    fn save(&mut self) -> std::result::Result<(), DocumentError> {
        std::fs::write(&self.path, self.buffer.text()).map_err(|source| DocumentError::Save {
            path: self.display.clone(),
            source,
        })?;
        tracing::debug!(path = %self.display, "Saved document");
        Ok(())
    }
}
