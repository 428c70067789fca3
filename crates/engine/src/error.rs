use gql_assist_config::ConfigError;
use gql_assist_patch::DocumentError;
use gql_assist_schema::SchemaError;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// The external generator could not produce text for a document.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("No generator command configured")]
    NotConfigured,

    #[error("Failed to start generator '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Generator failed ({status}): {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("Generator output is not valid UTF-8")]
    InvalidOutput,

    #[error("Generator I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode generator settings: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Generator task did not complete: {0}")]
    Interrupted(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
