use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a schema is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "location", rename_all = "camelCase")]
pub enum SchemaSource {
    File(PathBuf),
    Url(String),
}

impl SchemaSource {
    /// Interpret a user-supplied path or URL.
    ///
    /// Relative paths are resolved against `root` when one is given.
    #[must_use]
    pub fn parse(value: &str, root: Option<&Path>) -> Self {
        let value = value.trim();
        if is_url(value) {
            return Self::Url(value.to_string());
        }
        let path = PathBuf::from(value);
        match root {
            Some(root) if path.is_relative() => Self::File(root.join(path)),
            _ => Self::File(path),
        }
    }

    #[must_use]
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Url(_) => None,
        }
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// File name for local schemas, the full URL for remote ones.
    #[must_use]
    pub fn short_name(&self) -> String {
        match self {
            Self::File(path) => path.file_name().map_or_else(
                || path.display().to_string(),
                |name| name.to_string_lossy().into_owned(),
            ),
            Self::Url(url) => url.clone(),
        }
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

fn is_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert_eq!(
            SchemaSource::parse(" https://api.example.com/graphql ", None),
            SchemaSource::Url("https://api.example.com/graphql".to_string())
        );
        assert!(SchemaSource::parse("HTTP://localhost:4000", None).is_remote());
    }

    #[test]
    fn test_parse_relative_path() {
        let source = SchemaSource::parse("api/schema.graphql", Some(Path::new("/work")));
        assert_eq!(
            source,
            SchemaSource::File(PathBuf::from("/work/api/schema.graphql"))
        );
        assert_eq!(source.short_name(), "schema.graphql");
    }

    #[test]
    fn test_parse_absolute_path_ignores_root() {
        let source = SchemaSource::parse("/shared/schema.gql", Some(Path::new("/work")));
        assert_eq!(source.as_path(), Some(Path::new("/shared/schema.gql")));
    }
}
