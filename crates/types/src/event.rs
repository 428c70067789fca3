//! Host events and document snapshots.

use std::path::Path;

/// The host-editor events the core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    Created,
    Changed,
    Deleted,
    Saved,
    SelectionMoved,
}

impl HostEvent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Changed => "changed",
            Self::Deleted => "deleted",
            Self::Saved => "saved",
            Self::SelectionMoved => "selection",
        }
    }

    /// File-system events, as opposed to editor interaction events.
    #[must_use]
    pub const fn is_file_system(self) -> bool {
        matches!(self, Self::Created | Self::Changed | Self::Deleted)
    }
}

impl std::fmt::Display for HostEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A borrowed snapshot of a document: where it lives and its full current text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentRef<'a> {
    pub path: &'a str,
    pub text: &'a str,
}

impl<'a> DocumentRef<'a> {
    #[must_use]
    pub const fn new(path: &'a str, text: &'a str) -> Self {
        Self { path, text }
    }

    #[must_use]
    pub fn file_path(&self) -> &'a Path {
        Path::new(self.path)
    }
}
