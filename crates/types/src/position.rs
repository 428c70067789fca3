//! Editor coordinates.
//!
//! Lines are split on `\n` only, so a trailing `\r` stays part of its line.
//! Columns count UTF-16 code units, which is what LSP clients send by default.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A zero-based `(line, character)` location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    /// UTF-16 code units from the start of the line
    pub character: u32,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.character).cmp(&(other.line, other.character))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

/// Half-open span `[start, end)` of a document.
///
/// Nothing here enforces `start <= end`; an inverted range is rejected by
/// whatever applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Empty range at `position`, the anchor of an insertion.
    #[must_use]
    pub const fn at(position: Position) -> Self {
        Self::new(position, position)
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Length of `text` in UTF-16 code units.
#[must_use]
pub fn utf16_len(text: &str) -> u32 {
    text.chars().map(|c| c.len_utf16() as u32).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_sort_by_line_first() {
        let mut positions = vec![
            Position::new(2, 0),
            Position::new(0, 7),
            Position::new(1, 3),
            Position::new(0, 2),
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![
                Position::new(0, 2),
                Position::new(0, 7),
                Position::new(1, 3),
                Position::new(2, 0),
            ]
        );
    }

    #[test]
    fn test_insertion_anchor() {
        let anchor = Range::at(Position::new(4, 1));
        assert_eq!(anchor.start, anchor.end);
        assert!(!anchor.is_inverted());
    }

    #[test]
    fn test_inverted_range() {
        let range = Range::new(Position::new(3, 0), Position::new(2, 9));
        assert!(range.is_inverted());
        assert!(!Range::new(Position::new(2, 9), Position::new(3, 0)).is_inverted());
    }

    #[test]
    fn test_display() {
        let range = Range::new(Position::new(1, 2), Position::new(3, 4));
        assert_eq!(range.to_string(), "1:2-3:4");
    }

    #[test]
    fn test_utf16_len() {
        assert_eq!(utf16_len(""), 0);
        assert_eq!(utf16_len("type Query"), 10);
        assert_eq!(utf16_len("é"), 1);
        // surrogate pair
        assert_eq!(utf16_len("🚀"), 2);
    }
}
