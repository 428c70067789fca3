//! Schema discovery, loading and caching for gql-assist.
//!
//! A workspace has at most one active schema. [`SchemaResolver`] decides which
//! one (explicit selection, configured override, or the first schema file
//! found under the workspace roots), loads it through [`SchemaLoader`], and
//! keeps the result in a [`SchemaCache`] along with a [`FieldIndex`] the
//! generators can consult.
//!
//! Remote schemas are fetched with the introspection query and printed back
//! to SDL before parsing, so file and URL sources go through the same
//! validation.
//!
//! # Example
//!
//! ```no_run
//! use gql_assist_config::{AssistConfig, MemorySettings};
//! use gql_assist_schema::SchemaResolver;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # async fn run() -> gql_assist_schema::Result<()> {
//! let resolver = SchemaResolver::new(
//!     vec![PathBuf::from("/work/app")],
//!     &AssistConfig::default(),
//!     Arc::new(MemorySettings::new()),
//! )?;
//! let schema = resolver.resolve_and_load().await?;
//! println!("{} types", schema.index().len());
//! # Ok(())
//! # }
//! ```

mod cache;
mod client;
mod discovery;
mod error;
mod index;
mod introspection;
mod loader;
mod resolver;
mod sdl;
mod source;

pub use cache::{CachedSchema, SchemaCache};
pub use client::{parse_response, IntrospectionClient, IntrospectionError};
pub use discovery::find_schema_files;
pub use error::{Result, SchemaError};
pub use index::{FieldDescriptor, FieldIndex};
pub use introspection::{
    DirectiveDef, EnumValue, Field, FullType, InputValue, IntrospectionSchema, NamedRef,
    TypeKind, TypeRef, INTROSPECTION_QUERY,
};
pub use loader::{parse_schema, SchemaLoader};
pub use resolver::{SchemaChoice, SchemaResolver, SchemaStatus};
pub use sdl::introspection_to_sdl;
pub use source::SchemaSource;
