use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration in {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },

    #[error("Unsupported config file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Failed to persist workspace settings to {}: {message}", .path.display())]
    Settings { path: PathBuf, message: String },
}
