//! Finding schema files in workspace roots.

use gql_assist_config::FilePatterns;
use gql_assist_types::FileKind;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories never searched for schema files.
const IGNORED_DIRS: &[&str] = &["node_modules", ".git", "target", "dist"];

/// Every file under `roots` matching the schema patterns.
///
/// Roots are searched in order. Within a root, files matching an earlier
/// pattern come first, then shallower files, then by path. A file reachable
/// from two roots is listed once.
#[tracing::instrument(skip(patterns), fields(roots = roots.len()))]
pub fn find_schema_files(roots: &[PathBuf], patterns: &FilePatterns) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = Vec::new();

    for root in roots {
        let mut matches: Vec<(usize, usize, PathBuf)> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_ignored(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!(error = %err, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let path = entry.path();
                patterns
                    .match_index(&path.to_string_lossy(), FileKind::Schema)
                    .map(|order| (order, entry.depth(), path.to_path_buf()))
            })
            .collect();
        matches.sort();

        for (_, _, path) in matches {
            if !found.contains(&path) {
                found.push(path);
            }
        }
    }

    tracing::debug!(count = found.len(), "Schema candidates");
    found
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
}

/// Whether `path` lies inside one of `roots`.
#[must_use]
pub fn is_within(path: &Path, roots: &[PathBuf]) -> bool {
    roots.iter().any(|root| path.starts_with(root))
}
