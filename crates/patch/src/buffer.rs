//! A string addressed by editor coordinates.

use crate::{EditError, EditSession};
use gql_assist_types::{utf16_len, Position, Range};

/// Text with a line index, addressed by `(line, UTF-16 character)`.
///
/// Lines are split on `\n` only, so a `\r` before it is an ordinary
/// character at the end of its line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    line_starts: Vec<usize>,
}

impl TextBuffer {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = line_starts(&text);
        Self { text, line_starts }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Number of lines; an empty buffer has one empty line.
    #[must_use]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Content of `line` without its `\n` terminator.
    pub fn line(&self, line: u32) -> Result<&str, EditError> {
        let index = line as usize;
        let Some(&start) = self.line_starts.get(index) else {
            return Err(EditError::LineOutOfRange {
                line,
                line_count: self.line_count(),
            });
        };
        let end = self
            .line_starts
            .get(index + 1)
            .map_or(self.text.len(), |next| next - 1);
        Ok(&self.text[start..end])
    }

    /// Byte offset of `position`.
    pub fn offset_at(&self, position: Position) -> Result<usize, EditError> {
        let content = self.line(position.line)?;
        let base = self.line_starts[position.line as usize];

        let mut units = 0u32;
        for (idx, ch) in content.char_indices() {
            if units == position.character {
                return Ok(base + idx);
            }
            units += ch.len_utf16() as u32;
            if units > position.character {
                return Err(EditError::InsideSurrogatePair(position));
            }
        }

        if units == position.character {
            Ok(base + content.len())
        } else {
            Err(EditError::CharacterOutOfRange {
                line: position.line,
                character: position.character,
                line_length: units,
            })
        }
    }

    /// From the start of the first line to the end of the last line.
    #[must_use]
    pub fn full_range(&self) -> Range {
        let last = self.line_count().saturating_sub(1);
        let width = self.line(last).map_or(0, utf16_len);
        Range::new(Position::new(0, 0), Position::new(last, width))
    }

    /// Substitute the text covered by `range`.
    pub fn replace_range(&mut self, range: Range, text: &str) -> Result<(), EditError> {
        if range.is_inverted() {
            return Err(EditError::InvertedRange(range));
        }
        let start = self.offset_at(range.start)?;
        let end = self.offset_at(range.end)?;
        self.text.replace_range(start..end, text);
        self.line_starts = line_starts(&self.text);
        Ok(())
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect()
}

/// An edit session over a private copy of a buffer.
///
/// Nothing reaches the original buffer until [`StagedEdit::into_buffer`] is
/// taken and written back; [`EditSession::discard`] resets the copy.
#[derive(Debug)]
pub struct StagedEdit {
    original: TextBuffer,
    working: TextBuffer,
}

impl StagedEdit {
    #[must_use]
    pub fn new(buffer: TextBuffer) -> Self {
        Self {
            working: buffer.clone(),
            original: buffer,
        }
    }

    #[must_use]
    pub fn working(&self) -> &TextBuffer {
        &self.working
    }

    #[must_use]
    pub fn into_buffer(self) -> TextBuffer {
        self.working
    }
}

impl EditSession for StagedEdit {
    fn insert(&mut self, at: Position, text: &str) -> Result<(), EditError> {
        self.working.replace_range(Range::at(at), text)
    }

    fn delete(&mut self, range: Range) -> Result<(), EditError> {
        self.working.replace_range(range, "")
    }

    fn replace(&mut self, range: Range, text: &str) -> Result<(), EditError> {
        self.working.replace_range(range, text)
    }

    fn full_range(&self) -> Range {
        self.working.full_range()
    }

    fn discard(&mut self) {
        self.working = self.original.clone();
    }
}
