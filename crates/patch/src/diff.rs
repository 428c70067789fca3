//! Line diff producing [`EditAction`]s.
//!
//! Lines are compared first; each changed line that has a counterpart on the
//! other side is compared again on word, whitespace and punctuation tokens so
//! that a one-word change stays a one-word edit. All ranges are expressed in
//! the coordinates of the old text and never overlap, so applying the actions
//! back to front turns the old text into the new one.

use crate::{PatchError, Result};
use gql_assist_types::{utf16_len, EditAction, Position, Range, RawEditAction};
use similar::{Algorithm, DiffOp};

/// Computes the edit actions turning `old` into `new`.
pub trait LineDiff: Send + Sync {
    fn diff(&self, old: &str, new: &str) -> Result<Vec<EditAction>>;
}

impl<F> LineDiff for F
where
    F: Fn(&str, &str) -> Result<Vec<EditAction>> + Send + Sync,
{
    fn diff(&self, old: &str, new: &str) -> Result<Vec<EditAction>> {
        self(old, new)
    }
}

/// Decode actions coming from an untyped source, such as an external diff
/// routine speaking JSON.
pub fn decode_actions(raw: impl IntoIterator<Item = RawEditAction>) -> Result<Vec<EditAction>> {
    raw.into_iter()
        .map(|action| EditAction::try_from(action).map_err(PatchError::from))
        .collect()
}

/// Myers diff over lines, refined to tokens inside changed lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineDiffer;

impl LineDiff for LineDiffer {
    fn diff(&self, old: &str, new: &str) -> Result<Vec<EditAction>> {
        Ok(diff_lines(old, new))
    }
}

/// Lines of the old text, with their terminators.
struct OldLines<'a> {
    lines: &'a [&'a str],
}

impl OldLines<'_> {
    /// Position where line `index` starts; past the last line this is the
    /// end of the document.
    fn start_of(&self, index: usize) -> Position {
        if index < self.lines.len() {
            return Position::new(index as u32, 0);
        }
        match self.lines.last() {
            None => Position::new(0, 0),
            Some(last) if last.ends_with('\n') => Position::new(self.lines.len() as u32, 0),
            Some(last) => Position::new(self.lines.len() as u32 - 1, utf16_len(last)),
        }
    }
}

fn diff_lines(old: &str, new: &str) -> Vec<EditAction> {
    let old_lines: Vec<&str> = old.split_inclusive('\n').collect();
    let new_lines: Vec<&str> = new.split_inclusive('\n').collect();
    let table = OldLines { lines: &old_lines };

    let mut actions = Vec::new();
    for op in similar::capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines) {
        match op {
            DiffOp::Equal { .. } => {}
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                actions.push(EditAction::delete(Range::new(
                    table.start_of(old_index),
                    table.start_of(old_index + old_len),
                )));
            }
            DiffOp::Insert {
                old_index,
                new_index,
                new_len,
            } => {
                actions.push(EditAction::insert(
                    table.start_of(old_index),
                    new_lines[new_index..new_index + new_len].concat(),
                ));
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                let paired = old_len.min(new_len);
                for offset in 0..paired {
                    diff_line_pair(
                        (old_index + offset) as u32,
                        old_lines[old_index + offset],
                        new_lines[new_index + offset],
                        &mut actions,
                    );
                }
                if old_len > paired {
                    actions.push(EditAction::delete(Range::new(
                        table.start_of(old_index + paired),
                        table.start_of(old_index + old_len),
                    )));
                }
                if new_len > paired {
                    actions.push(EditAction::insert(
                        table.start_of(old_index + old_len),
                        new_lines[new_index + paired..new_index + new_len].concat(),
                    ));
                }
            }
        }
    }
    actions
}

/// Token-level actions turning `old` (line `line` of the old text) into `new`.
fn diff_line_pair(line: u32, old: &str, new: &str, actions: &mut Vec<EditAction>) {
    let (old_content, old_terminated) = split_terminator(old);
    let (new_content, new_terminated) = split_terminator(new);

    let old_tokens = tokenize(old_content);
    let new_tokens = tokenize(new_content);

    let mut columns = Vec::with_capacity(old_tokens.len() + 1);
    let mut column = 0u32;
    columns.push(column);
    for token in &old_tokens {
        column += utf16_len(token);
        columns.push(column);
    }
    let at = |index: usize| Position::new(line, columns[index]);

    for op in similar::capture_diff_slices(Algorithm::Myers, &old_tokens, &new_tokens) {
        match op {
            DiffOp::Equal { .. } => {}
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                actions.push(EditAction::delete(Range::new(
                    at(old_index),
                    at(old_index + old_len),
                )));
            }
            DiffOp::Insert {
                old_index,
                new_index,
                new_len,
            } => {
                actions.push(EditAction::insert(
                    at(old_index),
                    new_tokens[new_index..new_index + new_len].concat(),
                ));
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                actions.push(EditAction::replace(
                    Range::new(at(old_index), at(old_index + old_len)),
                    new_tokens[new_index..new_index + new_len].concat(),
                ));
            }
        }
    }

    let end_of_line = Position::new(line, column);
    match (old_terminated, new_terminated) {
        (false, true) => actions.push(EditAction::insert(end_of_line, "\n")),
        (true, false) => actions.push(EditAction::delete(Range::new(
            end_of_line,
            Position::new(line + 1, 0),
        ))),
        _ => {}
    }
}

fn split_terminator(line: &str) -> (&str, bool) {
    match line.strip_suffix('\n') {
        Some(content) => (content, true),
        None => (line, false),
    }
}

#[derive(PartialEq, Eq)]
enum TokenClass {
    Word,
    Space,
    Other,
}

impl TokenClass {
    fn of(ch: char) -> Self {
        if ch.is_alphanumeric() || ch == '_' {
            Self::Word
        } else if ch.is_whitespace() {
            Self::Space
        } else {
            Self::Other
        }
    }
}

/// Split a line into word runs, whitespace runs and single other characters.
fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<TokenClass> = None;

    for (idx, ch) in line.char_indices() {
        let class = TokenClass::of(ch);
        let continues = class != TokenClass::Other && current.as_ref() == Some(&class);
        if !continues && idx > start {
            tokens.push(&line[start..idx]);
            start = idx;
        }
        current = Some(class);
    }
    if start < line.len() {
        tokens.push(&line[start..]);
    }
    tokens
}
