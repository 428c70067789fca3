//! Reconciling generated text into a live document.

use crate::{DocumentError, EditError, EditSession, LineDiff, LineDiffer, LiveDocument};
use gql_assist_types::EditAction;

/// What [`PatchApplier::apply_generated_text`] did to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The document already held the generated text; nothing was edited or saved.
    Unchanged,
    /// The diff applied cleanly.
    Patched { actions: usize },
    /// The diff could not be produced or applied; the whole content was replaced.
    Replaced { reason: String },
}

/// Applies generated text to a [`LiveDocument`] as a minimal set of edits.
#[derive(Debug, Clone, Default)]
pub struct PatchApplier<D = LineDiffer> {
    differ: D,
}

impl<D: LineDiff> PatchApplier<D> {
    #[must_use]
    pub fn new(differ: D) -> Self {
        Self { differ }
    }

    /// Make `document` read `new_text` and save it.
    ///
    /// Edits the user made elsewhere in the buffer survive as long as the
    /// diff applies. When it does not, the staged edits are dropped and the
    /// content is replaced wholesale in the same session. Only a failure of
    /// that replacement, or of the save, is returned.
    #[tracing::instrument(skip(self, document, new_text), fields(path = document.path()))]
    pub fn apply_generated_text(
        &self,
        document: &mut dyn LiveDocument,
        new_text: &str,
    ) -> Result<PatchOutcome, DocumentError> {
        if document.text() == new_text {
            tracing::debug!("Generated text matches document");
            return Ok(PatchOutcome::Unchanged);
        }

        let mut fallback: Option<String> = None;

        match self.differ.diff(document.text(), new_text) {
            Ok(actions) => {
                let count = actions.len();
                document.edit(&mut |session| {
                    if let Err(err) = apply_edit_actions(session, &actions) {
                        tracing::warn!(error = %err, "Patch failed, replacing document content");
                        session.discard();
                        replace_all(session, new_text)?;
                        fallback = Some(err.to_string());
                    }
                    Ok(())
                })?;
                if fallback.is_none() {
                    tracing::debug!(actions = count, "Applied patch");
                    document.save()?;
                    return Ok(PatchOutcome::Patched { actions: count });
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Diff failed, replacing document content");
                document.edit(&mut |session| replace_all(session, new_text))?;
                fallback = Some(err.to_string());
            }
        }

        document.save()?;
        Ok(PatchOutcome::Replaced {
            reason: fallback.unwrap_or_default(),
        })
    }
}

fn replace_all(session: &mut dyn EditSession, text: &str) -> Result<(), EditError> {
    let range = session.full_range();
    session.replace(range, text)
}

/// Apply `actions` to `session` from the last position to the first.
///
/// Every range refers to the text before any action was applied; going back
/// to front means no applied action shifts one still pending. The sort is
/// stable, so insertions at one position keep their relative order.
pub fn apply_edit_actions(
    session: &mut dyn EditSession,
    actions: &[EditAction],
) -> Result<(), EditError> {
    let mut ordered: Vec<&EditAction> = actions.iter().collect();
    ordered.sort_by_key(|action| {
        let range = action.range();
        (range.start, range.end)
    });

    for action in ordered.into_iter().rev() {
        match action {
            EditAction::Insert { range, text } => session.insert(range.start, text)?,
            EditAction::Delete { range } => session.delete(*range)?,
            EditAction::Replace { range, text } => {
                let first_line = first_line(text);
                if first_line.len() != text.len() {
                    tracing::warn!(%range, "Replace text spans several lines, keeping the first");
                }
                session.replace(*range, first_line)?;
            }
        }
    }
    Ok(())
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode_actions, MemoryDocument, PatchError, StagedEdit, TextBuffer};
    use gql_assist_types::{Position, Range, RawEditAction};

    fn pos(line: u32, character: u32) -> Position {
        Position::new(line, character)
    }

    fn fixed(
        actions: Vec<EditAction>,
    ) -> impl Fn(&str, &str) -> crate::Result<Vec<EditAction>> + Send + Sync {
        move |_: &str, _: &str| Ok(actions.clone())
    }

    #[test]
    fn test_single_insert_patch() {
        let applier = PatchApplier::new(fixed(vec![EditAction::insert(
            pos(0, 15),
            " name: String",
        )]));
        let mut doc = MemoryDocument::new("user.gql.ts", "type A { id: ID }");

        let outcome = applier
            .apply_generated_text(&mut doc, "type A { id: ID name: String }")
            .unwrap();

        assert_eq!(outcome, PatchOutcome::Patched { actions: 1 });
        assert_eq!(doc.text(), "type A { id: ID name: String }");
        assert_eq!(doc.save_count(), 1);
    }

    #[test]
    fn test_line_differ_end_to_end() {
        let applier = PatchApplier::new(LineDiffer);
        let mut doc = MemoryDocument::new("user.gql.ts", "type A { id: ID }");

        let outcome = applier
            .apply_generated_text(&mut doc, "type A { id: ID name: String }")
            .unwrap();

        assert_eq!(outcome, PatchOutcome::Patched { actions: 1 });
        assert_eq!(doc.text(), "type A { id: ID name: String }");
    }

    #[test]
    fn test_unchanged_text_is_not_saved() {
        let applier = PatchApplier::new(LineDiffer);
        let mut doc = MemoryDocument::new("user.gql.ts", "same\n");

        let outcome = applier.apply_generated_text(&mut doc, "same\n").unwrap();

        assert_eq!(outcome, PatchOutcome::Unchanged);
        assert_eq!(doc.save_count(), 0);
    }

    #[test]
    fn test_out_of_range_action_falls_back_to_replace() {
        let applier = PatchApplier::new(fixed(vec![
            EditAction::insert(pos(0, 0), "// header\n"),
            EditAction::delete(Range::new(pos(7, 0), pos(9, 0))),
        ]));
        let mut doc = MemoryDocument::new("user.model.ts", "line one\nline two\n");

        let outcome = applier
            .apply_generated_text(&mut doc, "regenerated\n")
            .unwrap();

        assert!(matches!(outcome, PatchOutcome::Replaced { ref reason } if reason.contains("line 7")));
        assert_eq!(doc.text(), "regenerated\n");
        assert_eq!(doc.save_count(), 1);
    }

    #[test]
    fn test_surrogate_split_falls_back_to_replace() {
        let applier = PatchApplier::new(fixed(vec![EditAction::insert(pos(0, 1), "x")]));
        let mut doc = MemoryDocument::new("a.gql.ts", "\u{1F600}");

        let outcome = applier.apply_generated_text(&mut doc, "new").unwrap();

        assert!(matches!(outcome, PatchOutcome::Replaced { .. }));
        assert_eq!(doc.text(), "new");
    }

    #[test]
    fn test_unknown_action_kind_falls_back_to_replace() {
        let applier = PatchApplier::new(|_: &str, _: &str| {
            decode_actions([RawEditAction {
                kind: "MOVE".to_string(),
                range: Range::default(),
                text: None,
            }])
        });
        let mut doc = MemoryDocument::new("a.gql.ts", "old\n");

        let outcome = applier.apply_generated_text(&mut doc, "new\n").unwrap();

        assert!(matches!(outcome, PatchOutcome::Replaced { ref reason } if reason.contains("MOVE")));
        assert_eq!(doc.text(), "new\n");
        assert_eq!(doc.save_count(), 1);
    }

    #[test]
    fn test_diff_error_falls_back_to_replace() {
        let applier =
            PatchApplier::new(|_: &str, _: &str| {
            Err::<Vec<EditAction>, _>(PatchError::Diff("timed out".to_string()))
        });
        let mut doc = MemoryDocument::new("a.gql.ts", "old");

        let outcome = applier.apply_generated_text(&mut doc, "new").unwrap();

        assert_eq!(
            outcome,
            PatchOutcome::Replaced {
                reason: "diff failed: timed out".to_string()
            }
        );
        assert_eq!(doc.text(), "new");
    }

    #[test]
    fn test_closed_document_is_an_error() {
        let applier = PatchApplier::new(LineDiffer);
        let mut doc = MemoryDocument::new("a.gql.ts", "old");
        doc.close();

        let result = applier.apply_generated_text(&mut doc, "new");

        assert!(matches!(result, Err(DocumentError::Closed(_))));
        assert_eq!(doc.text(), "old");
    }

    #[test]
    fn test_replace_keeps_first_line_only() {
        let mut staged = StagedEdit::new(TextBuffer::new("a = 1;\n"));
        apply_edit_actions(
            &mut staged,
            &[EditAction::replace(
                Range::new(pos(0, 4), pos(0, 5)),
                "2\nstray",
            )],
        )
        .unwrap();
        assert_eq!(staged.working().text(), "a = 2;\n");
    }

    #[test]
    fn test_descending_order_is_required() {
        // "abcdef": insert "X" at 1, delete [2, 4), replace [4, 5) with "Y"
        let actions = vec![
            EditAction::insert(pos(0, 1), "X"),
            EditAction::delete(Range::new(pos(0, 2), pos(0, 4))),
            EditAction::replace(Range::new(pos(0, 4), pos(0, 5)), "Y"),
        ];

        let mut ascending = TextBuffer::new("abcdef");
        for action in &actions {
            let (range, text) = match action {
                EditAction::Insert { range, text } | EditAction::Replace { range, text } => {
                    (*range, text.as_str())
                }
                EditAction::Delete { range } => (*range, ""),
            };
            ascending.replace_range(range, text).unwrap();
        }
        assert_ne!(ascending.text(), "aXbYf");

        let mut staged = StagedEdit::new(TextBuffer::new("abcdef"));
        let mut shuffled = actions.clone();
        shuffled.reverse();
        shuffled.swap(0, 1);
        apply_edit_actions(&mut staged, &shuffled).unwrap();
        assert_eq!(staged.working().text(), "aXbYf");
    }

    #[test]
    fn test_same_position_inserts_keep_order() {
        let mut staged = StagedEdit::new(TextBuffer::new("ab"));
        apply_edit_actions(
            &mut staged,
            &[
                EditAction::insert(pos(0, 1), "1"),
                EditAction::insert(pos(0, 1), "2"),
                EditAction::insert(pos(0, 1), "3"),
            ],
        )
        .unwrap();
        assert_eq!(staged.working().text(), "a123b");
    }
}
