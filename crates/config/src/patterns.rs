//! Filename patterns per [`FileKind`].

use crate::{AssistConfig, ConfigError, Result};
use gql_assist_types::FileKind;
use std::collections::HashMap;

/// Order in which [`FilePatterns::classify`] tries the kinds.
///
/// More specific kinds go first: `.model.ts` is both a model and an enum
/// host, and the model generator also handles its enums.
const CLASSIFY_ORDER: [FileKind; 7] = [
    FileKind::Hook,
    FileKind::Resolver,
    FileKind::Model,
    FileKind::Input,
    FileKind::Response,
    FileKind::Enum,
    FileKind::Schema,
];

#[derive(Debug, Clone)]
enum Pattern {
    /// `.model.ts`, `schema.graphql`: the path ends with this text
    Suffix(String),
    /// `**/api/*.graphql`
    Glob(glob::Pattern),
}

impl Pattern {
    fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);

        if trimmed.contains(['*', '?', '[']) {
            let anchored = if trimmed.starts_with('/') || trimmed.starts_with("**") {
                trimmed.to_string()
            } else {
                format!("**/{trimmed}")
            };
            return glob::Pattern::new(&anchored)
                .map(Self::Glob)
                .map_err(|e| ConfigError::InvalidPattern {
                    pattern: raw.to_string(),
                    message: e.to_string(),
                });
        }

        Ok(Self::Suffix(trimmed.to_string()))
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Suffix(suffix) => path.ends_with(suffix.as_str()),
            Self::Glob(pattern) => pattern.matches(path),
        }
    }

    fn watch_glob(&self) -> String {
        match self {
            Self::Suffix(suffix) => format!("**/*{suffix}"),
            Self::Glob(pattern) => pattern.as_str().to_string(),
        }
    }
}

/// Compiled filename patterns for every [`FileKind`].
#[derive(Debug, Clone)]
pub struct FilePatterns {
    raw: HashMap<FileKind, Vec<String>>,
    compiled: HashMap<FileKind, Vec<Pattern>>,
}

impl Default for FilePatterns {
    fn default() -> Self {
        let mut raw = HashMap::new();
        let mut compiled = HashMap::new();
        for kind in FileKind::CONCRETE {
            let patterns: Vec<String> = AssistConfig::default_patterns(kind)
                .iter()
                .map(ToString::to_string)
                .collect();
            compiled.insert(
                kind,
                patterns
                    .iter()
                    .filter_map(|p| Pattern::parse(p).ok())
                    .collect(),
            );
            raw.insert(kind, patterns);
        }
        Self { raw, compiled }
    }
}

impl FilePatterns {
    /// Compile the patterns of every concrete kind in `config`.
    pub fn from_config(config: &AssistConfig) -> Result<Self> {
        let mut raw = HashMap::new();
        let mut compiled = HashMap::new();

        for kind in FileKind::CONCRETE {
            let patterns = config.patterns(kind);
            let parsed = patterns
                .iter()
                .map(|p| Pattern::parse(p))
                .collect::<Result<Vec<_>>>()?;
            compiled.insert(kind, parsed);
            raw.insert(kind, patterns);
        }

        Ok(Self { raw, compiled })
    }

    /// The configured patterns of `kind`; for [`FileKind::Any`] the union of all kinds.
    #[must_use]
    pub fn patterns(&self, kind: FileKind) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for k in Self::expand(kind) {
            for pattern in self.raw.get(k).into_iter().flatten() {
                if !out.contains(&pattern.as_str()) {
                    out.push(pattern);
                }
            }
        }
        out
    }

    /// Whether `path` matches any pattern of `kind`.
    #[must_use]
    pub fn matches(&self, path: &str, kind: FileKind) -> bool {
        let normalized = normalize(path);
        Self::expand(kind).iter().any(|k| {
            self.compiled
                .get(k)
                .is_some_and(|patterns| patterns.iter().any(|p| p.matches(&normalized)))
        })
    }

    /// Index of the first pattern of `kind` that `path` matches, in the order
    /// returned by [`FilePatterns::patterns`].
    #[must_use]
    pub fn match_index(&self, path: &str, kind: FileKind) -> Option<usize> {
        let normalized = normalize(path);
        Self::expand(kind)
            .iter()
            .flat_map(|k| self.compiled.get(k).into_iter().flatten())
            .position(|p| p.matches(&normalized))
    }

    /// The most specific concrete kind `path` belongs to, if any.
    #[must_use]
    pub fn classify(&self, path: &str) -> Option<FileKind> {
        CLASSIFY_ORDER
            .into_iter()
            .find(|kind| self.matches(path, *kind))
    }

    /// Glob patterns suitable for editor file watchers.
    #[must_use]
    pub fn watch_globs(&self, kind: FileKind) -> Vec<String> {
        let mut globs: Vec<String> = Vec::new();
        for k in Self::expand(kind) {
            for pattern in self.compiled.get(k).into_iter().flatten() {
                let glob = pattern.watch_glob();
                if !globs.contains(&glob) {
                    globs.push(glob);
                }
            }
        }
        globs
    }

    fn expand(kind: FileKind) -> &'static [FileKind] {
        match kind {
            FileKind::Any => &FileKind::CONCRETE,
            FileKind::Model => &[FileKind::Model],
            FileKind::Resolver => &[FileKind::Resolver],
            FileKind::Input => &[FileKind::Input],
            FileKind::Response => &[FileKind::Response],
            FileKind::Enum => &[FileKind::Enum],
            FileKind::Hook => &[FileKind::Hook],
            FileKind::Schema => &[FileKind::Schema],
        }
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}
