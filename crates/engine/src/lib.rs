//! The gql-assist processing pipeline.
//!
//! An [`Engine`] takes a document from a host event to a saved result:
//!
//! 1. the [`FingerprintTracker`](gql_assist_tracker::FingerprintTracker)
//!    drops documents whose text was already processed,
//! 2. the path decides the [`FileKind`](gql_assist_types::FileKind),
//! 3. kinds that need it get the active schema from the
//!    [`SchemaResolver`](gql_assist_schema::SchemaResolver),
//! 4. a [`Generator`] produces the new text,
//! 5. the [`PatchApplier`](gql_assist_patch::PatchApplier) reconciles it
//!    into the document and saves.
//!
//! Both the language server and the CLI drive this same pipeline.

mod document;
mod engine;
mod error;
mod generator;

pub use document::FileDocument;
pub use engine::{workspace_generator, Engine, ProcessOutcome, SkipReason};
pub use error::{EngineError, GenerateError, Result};
pub use generator::{
    CommandGenerator, GenerateRequest, Generator, BEHAVIOUR_ENV, KIND_ENV, SCHEMA_ENV,
};
