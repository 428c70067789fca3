//! Content fingerprint tracker.
//!
//! Decides, per `(event label, file path)` pair, whether a document has to be
//! processed again. Most host events (every keystroke, every cursor move) are
//! rejected by the filename check alone; the rest are compared by a SHA-256
//! fingerprint of the full text, so the same content seen twice under the same
//! label is only processed once.
//!
//! ```
//! use gql_assist_tracker::FingerprintTracker;
//! use gql_assist_types::{DocumentRef, FileKind};
//!
//! let tracker = FingerprintTracker::default();
//! let doc = DocumentRef::new("src/user.model.ts", "export class User {}");
//!
//! assert!(tracker.should_process(Some(doc), FileKind::Model, "generate"));
//! assert!(!tracker.should_process(Some(doc), FileKind::Model, "generate"));
//! ```

use dashmap::DashMap;
use gql_assist_config::FilePatterns;
use gql_assist_types::{DocumentRef, FileKind};
use sha2::{Digest, Sha256};
use std::sync::RwLock;

/// Hex-encoded SHA-256 of a document's full text.
#[must_use]
pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Remembers the last fingerprint seen for each `(event label, path)` key.
///
/// Entries are created on first observation and overwritten on change. They
/// are never required to be removed; an entry for a deleted file simply never
/// matches again.
#[derive(Debug, Default)]
pub struct FingerprintTracker {
    entries: DashMap<String, String>,
    patterns: RwLock<FilePatterns>,
}

impl FingerprintTracker {
    #[must_use]
    pub fn new(patterns: FilePatterns) -> Self {
        Self {
            entries: DashMap::new(),
            patterns: RwLock::new(patterns),
        }
    }

    /// Swap the filename patterns, e.g. after a configuration change.
    ///
    /// Recorded fingerprints are kept.
    pub fn set_patterns(&self, patterns: FilePatterns) {
        if let Ok(mut guard) = self.patterns.write() {
            *guard = patterns;
        }
    }

    /// Returns `true` when `document` should be processed for `event_label`.
    ///
    /// Returns `false` without touching any state when the document is absent
    /// or its path matches no pattern of `kind`. Otherwise the fingerprint of
    /// the text is compared with the one stored under
    /// `"{event_label}:{path}"`: equal means `false`, anything else stores the
    /// new fingerprint and returns `true`.
    ///
    /// The read and the write are not one atomic step. Two concurrent calls
    /// for the same key may both return `true`, which costs one redundant
    /// (idempotent) reprocessing.
    #[tracing::instrument(skip(self, document), fields(path = document.map(|d| d.path)))]
    pub fn should_process(
        &self,
        document: Option<DocumentRef<'_>>,
        kind: FileKind,
        event_label: &str,
    ) -> bool {
        let Some(document) = document else {
            return false;
        };

        let matches = self
            .patterns
            .read()
            .is_ok_and(|patterns| patterns.matches(document.path, kind));
        if !matches {
            tracing::trace!(%kind, "Path does not match kind");
            return false;
        }

        let key = format!("{event_label}:{}", document.path);
        let current = fingerprint(document.text);

        if self
            .entries
            .get(&key)
            .is_some_and(|stored| *stored == current)
        {
            tracing::debug!(key, "Content unchanged since last run");
            return false;
        }

        self.entries.insert(key, current);
        true
    }

    /// Drop every recorded fingerprint of `path`, across all event labels.
    pub fn forget(&self, path: &str) {
        let suffix = format!(":{path}");
        self.entries.retain(|key, _| !key.ends_with(&suffix));
    }

    /// Drop the fingerprint recorded for `path` under `event_label`, so the
    /// same text is processed again on its next event.
    pub fn forget_event(&self, path: &str, event_label: &str) {
        self.entries.remove(&format!("{event_label}:{path}"));
    }

    /// Number of recorded `(event label, path)` keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gql_assist_config::AssistConfig;

    const MODEL: &str = "src/user/user.model.ts";
    const TEXT: &str = "@ObjectType()\nexport class User {}\n";

    #[test]
    fn test_unchanged_document_is_processed_once() {
        let tracker = FingerprintTracker::default();
        let doc = DocumentRef::new(MODEL, TEXT);

        assert!(tracker.should_process(Some(doc), FileKind::Model, "generate"));
        assert!(!tracker.should_process(Some(doc), FileKind::Model, "generate"));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_event_labels_are_independent() {
        let tracker = FingerprintTracker::default();
        let doc = DocumentRef::new(MODEL, TEXT);

        assert!(tracker.should_process(Some(doc), FileKind::Model, "generate"));
        assert!(!tracker.should_process(Some(doc), FileKind::Model, "generate"));

        assert!(tracker.should_process(Some(doc), FileKind::Model, "diagnostics"));
        assert!(!tracker.should_process(Some(doc), FileKind::Model, "diagnostics"));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_kind_mismatch_records_nothing() {
        let tracker = FingerprintTracker::default();
        let doc = DocumentRef::new("src/foo.model.ts", TEXT);

        assert!(!tracker.should_process(Some(doc), FileKind::Resolver, "generate"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_absent_document() {
        let tracker = FingerprintTracker::default();
        assert!(!tracker.should_process(None, FileKind::Any, "generate"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_changed_content_is_processed_again() {
        let tracker = FingerprintTracker::default();

        assert!(tracker.should_process(
            Some(DocumentRef::new(MODEL, TEXT)),
            FileKind::Model,
            "generate"
        ));
        assert!(tracker.should_process(
            Some(DocumentRef::new(MODEL, "export class User { id: string }\n")),
            FileKind::Model,
            "generate"
        ));
        // reverting to earlier content is a change too
        assert!(tracker.should_process(
            Some(DocumentRef::new(MODEL, TEXT)),
            FileKind::Model,
            "generate"
        ));
    }

    #[test]
    fn test_any_accepts_every_kind() {
        let tracker = FingerprintTracker::default();
        for path in ["a.resolver.ts", "a.gql.ts", "/w/schema.graphql"] {
            assert!(tracker.should_process(
                Some(DocumentRef::new(path, "x")),
                FileKind::Any,
                "generate"
            ));
        }
        assert!(!tracker.should_process(
            Some(DocumentRef::new("a.service.ts", "x")),
            FileKind::Any,
            "generate"
        ));
    }

    #[test]
    fn test_set_patterns() {
        let tracker = FingerprintTracker::default();
        let doc = DocumentRef::new("src/user.entity.ts", TEXT);
        assert!(!tracker.should_process(Some(doc), FileKind::Model, "generate"));

        let mut config = AssistConfig::default();
        config.model.file_extensions = Some(vec![".entity.ts".to_string()]);
        tracker.set_patterns(FilePatterns::from_config(&config).unwrap());

        assert!(tracker.should_process(Some(doc), FileKind::Model, "generate"));
    }

    #[test]
    fn test_forget() {
        let tracker = FingerprintTracker::default();
        let doc = DocumentRef::new(MODEL, TEXT);
        tracker.should_process(Some(doc), FileKind::Model, "generate");
        tracker.should_process(Some(doc), FileKind::Model, "diagnostics");
        tracker.should_process(
            Some(DocumentRef::new("src/other.model.ts", TEXT)),
            FileKind::Model,
            "generate",
        );

        tracker.forget(MODEL);

        assert_eq!(tracker.len(), 1);
        assert!(tracker.should_process(Some(doc), FileKind::Model, "generate"));
    }

    #[test]
    fn test_forget_event_keeps_other_labels() {
        let tracker = FingerprintTracker::default();
        let doc = DocumentRef::new(MODEL, TEXT);
        tracker.should_process(Some(doc), FileKind::Model, "saved");
        tracker.should_process(Some(doc), FileKind::Model, "selection");

        tracker.forget_event(MODEL, "saved");
        tracker.forget_event(MODEL, "never-seen");

        assert_eq!(tracker.len(), 1);
        assert!(tracker.should_process(Some(doc), FileKind::Model, "saved"));
        assert!(!tracker.should_process(Some(doc), FileKind::Model, "selection"));
    }

    #[test]
    fn test_fingerprint_is_sha256_hex() {
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(fingerprint("a"), fingerprint("b"));
    }
}
