use crate::IntrospectionError;
use gql_assist_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("No schema file found in: {}", display_roots(.roots))]
    NoSchemaFound { roots: Vec<PathBuf> },

    #[error("Failed to read schema {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid schema {location}:\n{message}")]
    Parse { location: String, message: String },

    #[error("Failed to fetch schema from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: IntrospectionError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SchemaError {
    /// A schema was chosen but could not be loaded, as opposed to there
    /// being no schema at all.
    #[must_use]
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::Read { .. } | Self::Parse { .. } | Self::Fetch { .. }
        )
    }
}

fn display_roots(roots: &[PathBuf]) -> String {
    if roots.is_empty() {
        return "(no workspace roots)".to_string();
    }
    roots
        .iter()
        .map(|root| root.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
