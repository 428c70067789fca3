use gql_assist_types::FileKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level gql-assist configuration.
///
/// Every field has a default, so `{}` (or no file at all) is a complete
/// configuration. Pattern lists left unset fall back to the defaults of their
/// kind, see [`AssistConfig::patterns`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssistConfig {
    /// Options forwarded verbatim to the generator
    pub behaviour: BehaviourConfig,
    pub model: KindConfig,
    pub resolver: KindConfig,
    pub input: KindConfig,
    pub response: KindConfig,
    #[serde(rename = "enum")]
    pub enums: KindConfig,
    pub react_hook: ReactHookConfig,
    /// Run generation whenever a matching document is saved
    pub run_on_save: bool,
    /// Schema file path or `http(s)://` endpoint used when the user has not
    /// picked one explicitly
    pub schema_override: Option<String>,
    pub introspection: IntrospectionConfig,
    pub generator: GeneratorConfig,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            behaviour: BehaviourConfig::default(),
            model: KindConfig::default(),
            resolver: KindConfig::default(),
            input: KindConfig::default(),
            response: KindConfig::default(),
            enums: KindConfig::default(),
            react_hook: ReactHookConfig::default(),
            run_on_save: true,
            schema_override: None,
            introspection: IntrospectionConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl AssistConfig {
    /// Default filename patterns for a concrete kind.
    ///
    /// [`FileKind::Any`] has no patterns of its own; it is always the union
    /// of the concrete kinds.
    #[must_use]
    pub fn default_patterns(kind: FileKind) -> &'static [&'static str] {
        match kind {
            FileKind::Model => &[".model.ts"],
            FileKind::Resolver => &[".resolver.ts"],
            FileKind::Input => &[".input.ts"],
            FileKind::Response => &[".response.ts"],
            FileKind::Enum => &[".enum.ts", ".model.ts", ".input.ts", ".response.ts"],
            FileKind::Hook => &[".gql.ts"],
            FileKind::Schema => &["./schema.gql", "schema.graphql"],
            FileKind::Any => &[],
        }
    }

    /// Filename patterns configured for `kind`, or its defaults.
    ///
    /// For [`FileKind::Any`] this is the union of every concrete kind, in
    /// declaration order with duplicates removed.
    #[must_use]
    pub fn patterns(&self, kind: FileKind) -> Vec<String> {
        if kind == FileKind::Any {
            let mut all: Vec<String> = Vec::new();
            for concrete in FileKind::CONCRETE {
                for pattern in self.patterns(concrete) {
                    if !all.contains(&pattern) {
                        all.push(pattern);
                    }
                }
            }
            return all;
        }

        let configured = match kind {
            FileKind::Model => self.model.file_extensions.as_ref(),
            FileKind::Resolver => self.resolver.file_extensions.as_ref(),
            FileKind::Input => self.input.file_extensions.as_ref(),
            FileKind::Response => self.response.file_extensions.as_ref(),
            FileKind::Enum => self.enums.file_extensions.as_ref(),
            FileKind::Hook => self.react_hook.file_extensions.as_ref(),
            FileKind::Schema => self.react_hook.schema.as_ref(),
            FileKind::Any => None,
        };

        configured.map_or_else(
            || {
                Self::default_patterns(kind)
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            },
            Clone::clone,
        )
    }

    /// Whether generation is enabled for `kind`.
    ///
    /// Schema files are never generated into.
    #[must_use]
    pub const fn is_enabled(&self, kind: FileKind) -> bool {
        match kind {
            FileKind::Model => self.model.enable,
            FileKind::Resolver => self.resolver.enable,
            FileKind::Input => self.input.enable,
            FileKind::Response => self.response.enable,
            FileKind::Enum => self.enums.enable,
            FileKind::Hook => self.react_hook.enable,
            FileKind::Schema => false,
            FileKind::Any => true,
        }
    }
}

/// Generation behaviour shared by every kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviourConfig {
    pub nullable_by_default: bool,
    pub server_library: String,
    pub default_number_type: String,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            nullable_by_default: true,
            server_library: "@nestjs/graphql".to_string(),
            default_number_type: "Int".to_string(),
        }
    }
}

/// Per-kind switch and filename patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KindConfig {
    pub enable: bool,
    /// Filename suffixes (or globs); `None` means the kind's defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extensions: Option<Vec<String>>,
}

impl Default for KindConfig {
    fn default() -> Self {
        Self {
            enable: true,
            file_extensions: None,
        }
    }
}

/// Client hook generation, which also owns the schema file patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReactHookConfig {
    pub enable: bool,
    pub library: String,
    /// Schema filename patterns; `None` means `./schema.gql` and `schema.graphql`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extensions: Option<Vec<String>>,
}

impl Default for ReactHookConfig {
    fn default() -> Self {
        Self {
            enable: true,
            library: "@apollo/client".to_string(),
            schema: None,
            file_extensions: None,
        }
    }
}

/// Settings for fetching a remote schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntrospectionConfig {
    pub headers: BTreeMap<String, String>,
    pub timeout_secs: u64,
    pub retries: u32,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            headers: BTreeMap::new(),
            timeout_secs: 30,
            retries: 0,
        }
    }
}

/// The external code generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// Program and leading arguments; the document path is appended
    pub command: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "npx".to_string(),
                "gql-assist".to_string(),
                "generate".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns() {
        let config = AssistConfig::default();
        assert_eq!(config.patterns(FileKind::Model), vec![".model.ts"]);
        assert_eq!(
            config.patterns(FileKind::Schema),
            vec!["./schema.gql", "schema.graphql"]
        );
        assert_eq!(config.patterns(FileKind::Enum).len(), 4);
    }

    #[test]
    fn test_any_is_union_without_duplicates() {
        let config = AssistConfig::default();
        let any = config.patterns(FileKind::Any);

        assert_eq!(
            any,
            vec![
                ".model.ts",
                ".resolver.ts",
                ".input.ts",
                ".response.ts",
                ".enum.ts",
                ".gql.ts",
                "./schema.gql",
                "schema.graphql",
            ]
        );
    }

    #[test]
    fn test_configured_patterns_replace_defaults() {
        let mut config = AssistConfig::default();
        config.model.file_extensions = Some(vec![".entity.ts".to_string()]);

        assert_eq!(config.patterns(FileKind::Model), vec![".entity.ts"]);
        let any = config.patterns(FileKind::Any);
        assert!(any.contains(&".entity.ts".to_string()));
        // still contributed by the enum defaults
        assert!(any.contains(&".model.ts".to_string()));
    }

    #[test]
    fn test_schema_never_enabled() {
        let config = AssistConfig::default();
        assert!(!config.is_enabled(FileKind::Schema));
        assert!(config.is_enabled(FileKind::Hook));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AssistConfig =
            serde_json::from_str(r#"{"model": {"enable": false}, "runOnSave": false}"#).unwrap();

        assert!(!config.model.enable);
        assert_eq!(config.model.file_extensions, None);
        assert!(!config.run_on_save);
        assert!(config.behaviour.nullable_by_default);
        assert_eq!(config.react_hook.library, "@apollo/client");
        assert_eq!(config.introspection.timeout_secs, 30);
    }

    #[test]
    fn test_enum_key() {
        let config: AssistConfig =
            serde_json::from_str(r#"{"enum": {"fileExtensions": [".enum.ts"]}}"#).unwrap();
        assert_eq!(config.patterns(FileKind::Enum), vec![".enum.ts"]);
    }
}
