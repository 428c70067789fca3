//! Exit codes for the gql-assist CLI.
//!
//! Distinct codes let scripts and CI tell failure modes apart.

use gql_assist_config::ConfigError;
use gql_assist_engine::{EngineError, GenerateError};
use gql_assist_schema::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - no errors
    Success = 0,
    /// The generator failed for at least one file
    GenerateError = 1,
    /// Configuration error (missing or invalid config file)
    ConfigError = 2,
    /// Schema load error (no schema, unreadable, invalid, fetch failed)
    SchemaError = 3,
    /// I/O error (file read/write failure)
    IoError = 4,
}

impl ExitCode {
    /// Exit the process with this exit code.
    pub fn exit(self) -> ! {
        std::process::exit(self as i32)
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// The code for an error that ended the command.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.is::<ConfigError>() {
                return Self::ConfigError;
            }
            if cause.is::<SchemaError>() {
                return Self::SchemaError;
            }
            if let Some(engine) = cause.downcast_ref::<EngineError>() {
                return match engine {
                    EngineError::Config(_) => Self::ConfigError,
                    EngineError::Schema(_) => Self::SchemaError,
                    EngineError::Read { .. } | EngineError::Document(_) => Self::IoError,
                    EngineError::Generate(_) => Self::GenerateError,
                };
            }
            if cause.is::<GenerateError>() {
                return Self::GenerateError;
            }
            if cause.is::<std::io::Error>() {
                return Self::IoError;
            }
        }
        Self::GenerateError
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::GenerateError => write!(f, "generation error"),
            Self::ConfigError => write!(f, "configuration error"),
            Self::SchemaError => write!(f, "schema load error"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_codes() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::SchemaError.code(), 3);
        assert_eq!(ExitCode::IoError.to_string(), "I/O error");
    }

    #[test]
    fn test_code_for_wrapped_errors() {
        let err = Err::<(), _>(SchemaError::NoSchemaFound { roots: vec![] })
            .context("loading schema")
            .unwrap_err();
        assert_eq!(ExitCode::for_error(&err), ExitCode::SchemaError);

        let err = anyhow::Error::from(EngineError::Read {
            path: PathBuf::from("a.model.ts"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(ExitCode::for_error(&err), ExitCode::IoError);

        let err = anyhow::Error::from(EngineError::Config(ConfigError::InvalidPattern {
            pattern: String::new(),
            message: "empty".to_string(),
        }));
        assert_eq!(ExitCode::for_error(&err), ExitCode::ConfigError);

        assert_eq!(
            ExitCode::for_error(&anyhow::anyhow!("something else")),
            ExitCode::GenerateError
        );
    }
}
