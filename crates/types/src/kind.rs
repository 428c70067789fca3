//! Artifact categories a workspace file can belong to.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Recognized artifact category of a file.
///
/// The category is decided by which filename patterns a path matches,
/// never by inspecting the content. Each kind maps to a configurable set of
/// suffix patterns; [`FileKind::Any`] stands for the union of all the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    /// Object type models (`.model.ts`)
    Model,
    /// Resolver classes (`.resolver.ts`)
    Resolver,
    /// Input types (`.input.ts`)
    Input,
    /// Response types (`.response.ts`)
    Response,
    /// Enum registrations, which can live in several other kinds of files
    Enum,
    /// Client hooks generated from GraphQL documents (`.gql.ts`)
    Hook,
    /// The schema definition itself
    Schema,
    /// Any of the above
    Any,
}

impl FileKind {
    /// Every concrete kind, i.e. all kinds except [`FileKind::Any`].
    pub const CONCRETE: [Self; 7] = [
        Self::Model,
        Self::Resolver,
        Self::Input,
        Self::Response,
        Self::Enum,
        Self::Hook,
        Self::Schema,
    ];

    /// Stable lowercase name, as used in configuration and environment variables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Resolver => "resolver",
            Self::Input => "input",
            Self::Response => "response",
            Self::Enum => "enum",
            Self::Hook => "hook",
            Self::Schema => "schema",
            Self::Any => "any",
        }
    }

    /// Returns `true` for kinds whose generation needs the loaded schema.
    #[must_use]
    pub const fn needs_schema(self) -> bool {
        matches!(self, Self::Hook)
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown file kind '{0}'")]
pub struct UnknownFileKind(pub String);

impl FromStr for FileKind {
    type Err = UnknownFileKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "model" => Ok(Self::Model),
            "resolver" => Ok(Self::Resolver),
            "input" => Ok(Self::Input),
            "response" => Ok(Self::Response),
            "enum" => Ok(Self::Enum),
            "hook" | "reacthook" => Ok(Self::Hook),
            "schema" => Ok(Self::Schema),
            "any" => Ok(Self::Any),
            _ => Err(UnknownFileKind(s.to_string())),
        }
    }
}
