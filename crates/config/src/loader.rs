use crate::{AssistConfig, ConfigError, Result};
use gql_assist_types::FileKind;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names to search for, in order of preference
pub const CONFIG_FILES: &[&str] = &[
    ".gqlassistrc.yml",
    ".gqlassistrc.yaml",
    ".gqlassistrc.json",
    ".gqlassistrc",
    "gql-assist.config.yml",
    "gql-assist.config.yaml",
    "gql-assist.config.json",
];

/// Walk up from `start_dir` to the file-system root, returning the first
/// config file found. Within one directory, [`CONFIG_FILES`] order wins.
#[tracing::instrument(fields(start = %start_dir.display()))]
pub fn find_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    for dir in start_dir.ancestors() {
        tracing::trace!(dir = %dir.display(), "Looking for config");
        if let Some(found) = CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            tracing::info!(path = %found.display(), "Found config file");
            return Ok(Some(found));
        }
    }
    tracing::debug!("No config file, using defaults");
    Ok(None)
}

/// Read and validate a config file.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<AssistConfig> {
    let contents = fs::read_to_string(path)?;
    let config = load_config_from_str(&contents, path)?;
    tracing::info!(
        run_on_save = config.run_on_save,
        schema_override = config.schema_override.as_deref().unwrap_or("-"),
        "Loaded config"
    );
    Ok(config)
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Yaml,
    Json,
    /// `.gqlassistrc`: JSON first, then YAML
    Either,
}

fn detect_format(path: &Path) -> Option<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yml" | "yaml") => Some(Format::Yaml),
        Some("json") => Some(Format::Json),
        None if path.file_name().is_some_and(|name| name == ".gqlassistrc") => {
            Some(Format::Either)
        }
        _ => None,
    }
}

/// Parse and validate config text; `path` picks the format and labels errors.
#[tracing::instrument(skip(contents), fields(path = %path.display(), size = contents.len()))]
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<AssistConfig> {
    let format =
        detect_format(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
    tracing::debug!(?format, "Parsing config");

    let config = match format {
        Format::Yaml => parse_yaml(contents, path)?,
        Format::Json => parse_json(contents, path)?,
        Format::Either => parse_json(contents, path).or_else(|_| parse_yaml(contents, path))?,
    };
    validate_config(&config, path)?;
    Ok(config)
}

/// Find and load the config for a workspace root, falling back to defaults
/// when no config file exists.
///
/// Returns the config together with the file it came from, if any.
pub fn load_or_default(root: &Path) -> Result<(AssistConfig, Option<PathBuf>)> {
    match find_config(root)? {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((config, Some(path)))
        }
        None => Ok((AssistConfig::default(), None)),
    }
}

fn parse_yaml(contents: &str, path: &Path) -> Result<AssistConfig> {
    if contents.trim().is_empty() {
        return Ok(AssistConfig::default());
    }
    serde_saphyr::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("invalid YAML: {e}"),
    })
}

fn parse_json(contents: &str, path: &Path) -> Result<AssistConfig> {
    serde_json::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("invalid JSON: {e}"),
    })
}

#[tracing::instrument(skip(config, path), fields(path = %path.display()))]
fn validate_config(config: &AssistConfig, path: &Path) -> Result<()> {
    let invalid = |message: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    for kind in FileKind::CONCRETE {
        let patterns = config.patterns(kind);
        if patterns.is_empty() {
            return Err(invalid(format!("'{kind}' has an empty list of file patterns")));
        }
        if patterns.iter().any(|pattern| pattern.trim().is_empty()) {
            return Err(invalid(format!("'{kind}' has an empty file pattern")));
        }
    }

    if let Some(ref schema) = config.schema_override {
        if schema.trim().is_empty() {
            return Err(invalid("schemaOverride cannot be empty".to_string()));
        }
    }

    if config.generator.command.is_empty() {
        return Err(invalid("generator.command cannot be empty".to_string()));
    }

    Ok(())
}
