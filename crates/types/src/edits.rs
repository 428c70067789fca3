//! Edit actions produced by line diffs.

use crate::Range;
use serde::{Deserialize, Serialize};

/// One atomic text operation over a range of the *original* document.
///
/// A diff produces these in ascending position order. They must be applied
/// back to front, so that applying one never shifts the coordinates of an
/// action that is still pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEditAction", into = "RawEditAction")]
pub enum EditAction {
    /// Insert `text` at `range.start`; the rest of the range is ignored.
    Insert { range: Range, text: String },
    /// Remove the text covered by `range`.
    Delete { range: Range },
    /// Substitute the text covered by `range` with the first line of `text`.
    Replace { range: Range, text: String },
}

impl EditAction {
    /// Create an insertion at a single position.
    #[must_use]
    pub fn insert(at: crate::Position, text: impl Into<String>) -> Self {
        Self::Insert {
            range: Range::at(at),
            text: text.into(),
        }
    }

    /// Create a deletion.
    #[must_use]
    pub const fn delete(range: Range) -> Self {
        Self::Delete { range }
    }

    /// Create a replacement.
    #[must_use]
    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self::Replace {
            range,
            text: text.into(),
        }
    }

    /// Target range in original-document coordinates.
    #[must_use]
    pub const fn range(&self) -> Range {
        match self {
            Self::Insert { range, .. } | Self::Delete { range } | Self::Replace { range, .. } => {
                *range
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EditActionKind {
        match self {
            Self::Insert { .. } => EditActionKind::Insert,
            Self::Delete { .. } => EditActionKind::Delete,
            Self::Replace { .. } => EditActionKind::Replace,
        }
    }
}

/// Discriminant of an [`EditAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditActionKind {
    Insert,
    Delete,
    Replace,
}

impl EditActionKind {
    /// Wire tag for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Delete => "DELETE",
            Self::Replace => "REPLACE",
        }
    }
}

/// Edit action as exchanged with external diff routines.
///
/// `{"type": "INSERT" | "DELETE" | "REPLACE", "range": {...}, "text": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEditAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub range: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Raised when an edit action carries a tag other than INSERT, DELETE or REPLACE.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown edit action kind '{0}'")]
pub struct UnknownEditActionKind(pub String);

impl TryFrom<RawEditAction> for EditAction {
    type Error = UnknownEditActionKind;

    fn try_from(raw: RawEditAction) -> Result<Self, Self::Error> {
        let text = raw.text.unwrap_or_default();
        match raw.kind.as_str() {
            "INSERT" => Ok(Self::Insert {
                range: raw.range,
                text,
            }),
            "DELETE" => Ok(Self::Delete { range: raw.range }),
            "REPLACE" => Ok(Self::Replace {
                range: raw.range,
                text,
            }),
            _ => Err(UnknownEditActionKind(raw.kind)),
        }
    }
}

impl From<EditAction> for RawEditAction {
    fn from(action: EditAction) -> Self {
        let kind = action.kind().as_str().to_string();
        match action {
            EditAction::Insert { range, text } | EditAction::Replace { range, text } => Self {
                kind,
                range,
                text: Some(text),
            },
            EditAction::Delete { range } => Self {
                kind,
                range,
                text: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    #[test]
    fn test_insert_is_zero_width() {
        let action = EditAction::insert(Position::new(2, 4), "name: String");
        assert_eq!(action.range(), Range::at(Position::new(2, 4)));
        assert_eq!(action.kind(), EditActionKind::Insert);
    }

    #[test]
    fn test_decode_from_wire() {
        let json = r#"[
            {"type": "DELETE", "range": {"start": {"line": 0, "character": 0}, "end": {"line": 1, "character": 0}}},
            {"type": "REPLACE", "range": {"start": {"line": 1, "character": 2}, "end": {"line": 1, "character": 5}}, "text": "abc"}
        ]"#;

        let actions: Vec<EditAction> = serde_json::from_str(json).unwrap();
        assert_eq!(
            actions,
            vec![
                EditAction::delete(Range::new(Position::new(0, 0), Position::new(1, 0))),
                EditAction::replace(Range::new(Position::new(1, 2), Position::new(1, 5)), "abc"),
            ]
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"{"type": "MOVE", "range": {"start": {"line": 0, "character": 0}, "end": {"line": 0, "character": 0}}}"#;

        let err = serde_json::from_str::<EditAction>(json).unwrap_err();
        assert!(err.to_string().contains("unknown edit action kind 'MOVE'"));
    }

    #[test]
    fn test_encode_uses_wire_tags() {
        let action = EditAction::delete(Range::new(Position::new(3, 0), Position::new(4, 0)));
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["type"], "DELETE");
        assert!(value.get("text").is_none());
    }
}
