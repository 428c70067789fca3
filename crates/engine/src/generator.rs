//! The code generator collaborator.
//!
//! gql-assist never generates code itself. A [`Generator`] receives the
//! document and the active schema and answers with the document's new text.

use crate::GenerateError;
use gql_assist_config::{BehaviourConfig, GeneratorConfig};
use gql_assist_schema::CachedSchema;
use gql_assist_types::FileKind;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Kind of the document being generated (`model`, `hook`, ...).
pub const KIND_ENV: &str = "GQL_ASSIST_KIND";
/// The `behaviour` configuration section as JSON.
pub const BEHAVIOUR_ENV: &str = "GQL_ASSIST_BEHAVIOUR";
/// Path of a file holding the active schema's SDL. Unset without a schema.
pub const SCHEMA_ENV: &str = "GQL_ASSIST_SCHEMA";

/// Everything a generator gets to see about one document.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub path: PathBuf,
    pub text: String,
    pub kind: FileKind,
    pub schema: Option<Arc<CachedSchema>>,
    pub behaviour: BehaviourConfig,
}

/// Produces the new text of a document.
///
/// `Ok(None)` means there is nothing to generate and the document stays as
/// it is.
pub trait Generator: Send + Sync {
    fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, GenerateError>;
}

impl<F> Generator for F
where
    F: Fn(&GenerateRequest) -> Result<Option<String>, GenerateError> + Send + Sync,
{
    fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, GenerateError> {
        self(request)
    }
}

/// Runs an external command per document.
///
/// The document path is appended to the arguments and its text is written to
/// stdin; stdout is the new text. Empty output means nothing to generate, a
/// non-zero exit status is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandGenerator {
    #[must_use]
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: None,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GenerateError> {
        let (program, args) = config
            .command
            .split_first()
            .ok_or(GenerateError::NotConfigured)?;
        Ok(Self::new(program.clone(), args.iter().cloned()))
    }

    /// Run the command from `dir` instead of the current directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Generator for CommandGenerator {
    #[tracing::instrument(skip(self, request), fields(program = %self.program, path = %request.path.display(), kind = %request.kind))]
    fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, GenerateError> {
        let behaviour = serde_json::to_string(&request.behaviour)?;
        // must outlive the child process
        let schema_file = request
            .schema
            .as_ref()
            .map(|schema| write_schema(schema.sdl()))
            .transpose()?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&request.path)
            .env(KIND_ENV, request.kind.as_str())
            .env(BEHAVIOUR_ENV, behaviour)
            .env_remove(SCHEMA_ENV)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(file) = &schema_file {
            command.env(SCHEMA_ENV, file.path());
        }
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| GenerateError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // Feed stdin from another thread so a generator that writes before it
        // has read everything cannot fill the stdout pipe and stall us both.
        let writer = child.stdin.take().map(|mut stdin| {
            let text = request.text.clone();
            std::thread::spawn(move || stdin.write_all(text.as_bytes()))
        });

        let output = child.wait_with_output()?;

        if let Some(Ok(Err(err))) = writer.map(std::thread::JoinHandle::join) {
            // the generator may legitimately ignore its input
            if err.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(GenerateError::Io(err));
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(status = %output.status, %stderr, "Generator failed");
            return Err(GenerateError::Failed {
                status: output.status,
                stderr,
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| GenerateError::InvalidOutput)?;
        if stdout.trim().is_empty() {
            tracing::debug!("Generator produced no output");
            return Ok(None);
        }
        Ok(Some(stdout))
    }
}

fn write_schema(sdl: &str) -> Result<NamedTempFile, GenerateError> {
    let mut file = tempfile::Builder::new()
        .prefix("gql-assist-schema-")
        .suffix(".graphql")
        .tempfile()?;
    file.write_all(sdl.as_bytes())?;
    file.flush()?;
    Ok(file)
}
