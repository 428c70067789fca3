use gql_assist_types::{Position, Range, UnknownEditActionKind};
use thiserror::Error;

/// A single edit could not be applied to a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("line {line} is out of range (document has {line_count} lines)")]
    LineOutOfRange { line: u32, line_count: u32 },

    #[error("character {character} is out of range on line {line} (line length {line_length})")]
    CharacterOutOfRange {
        line: u32,
        character: u32,
        line_length: u32,
    },

    #[error("position {0} falls inside a surrogate pair")]
    InsideSurrogatePair(Position),

    #[error("range {0} ends before it starts")]
    InvertedRange(Range),
}

/// The host document refused an edit session or a save.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("document {0} is closed")]
    Closed(String),

    #[error("failed to save {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Producing or decoding the edit actions for a document failed.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error(transparent)]
    UnknownEditActionKind(#[from] UnknownEditActionKind),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("diff failed: {0}")]
    Diff(String),
}

pub type Result<T> = std::result::Result<T, PatchError>;
