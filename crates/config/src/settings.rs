//! Workspace-scoped settings persisted across sessions.
//!
//! Only the user's explicit schema choice lives here. It is kept apart from
//! the config file so that picking a schema in the editor never rewrites a
//! file the user maintains by hand.

use crate::{ConfigError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Directory (relative to the workspace root) holding persisted settings
pub const SETTINGS_DIR: &str = ".gql-assist";

/// File name of the settings document inside [`SETTINGS_DIR`]
pub const SETTINGS_FILE: &str = "settings.json";

const SCHEMA_KEY: &str = "schema";

/// A key-value store owned by the host for workspace settings.
pub trait SettingsStore: Send + Sync {
    /// The schema path or URL the user selected, if any.
    fn selected_schema(&self) -> Option<String>;

    /// Persist a new selection; `None` clears it.
    fn set_selected_schema(&self, value: Option<&str>) -> Result<()>;
}

/// Settings stored as JSON in `<root>/.gql-assist/settings.json`.
#[derive(Debug)]
pub struct WorkspaceSettings {
    path: PathBuf,
}

impl WorkspaceSettings {
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(SETTINGS_DIR).join(SETTINGS_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Map<String, Value> {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return Map::new();
        };
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "Ignoring malformed workspace settings");
                Map::new()
            }
        }
    }

    fn write(&self, map: &Map<String, Value>) -> Result<()> {
        let to_error = |message: String| ConfigError::Settings {
            path: self.path.clone(),
            message,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| to_error(e.to_string()))?;
        }
        let contents =
            serde_json::to_string_pretty(map).map_err(|e| to_error(e.to_string()))?;
        fs::write(&self.path, contents + "\n").map_err(|e| to_error(e.to_string()))
    }
}

impl SettingsStore for WorkspaceSettings {
    fn selected_schema(&self) -> Option<String> {
        self.read()
            .get(SCHEMA_KEY)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(ToString::to_string)
    }

    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn set_selected_schema(&self, value: Option<&str>) -> Result<()> {
        let mut map = self.read();
        match value {
            Some(schema) => {
                map.insert(SCHEMA_KEY.to_string(), Value::String(schema.to_string()));
            }
            None => {
                if map.remove(SCHEMA_KEY).is_none() && !self.path.exists() {
                    return Ok(());
                }
            }
        }
        self.write(&map)?;
        tracing::info!("Persisted schema selection");
        Ok(())
    }
}

/// In-memory settings, for tests and for hosts without a writable workspace.
#[derive(Debug, Default)]
pub struct MemorySettings {
    schema: Mutex<Option<String>>,
}

impl MemorySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_schema(schema: impl Into<String>) -> Self {
        Self {
            schema: Mutex::new(Some(schema.into())),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn selected_schema(&self) -> Option<String> {
        self.schema.lock().ok().and_then(|guard| guard.clone())
    }

    fn set_selected_schema(&self, value: Option<&str>) -> Result<()> {
        if let Ok(mut guard) = self.schema.lock() {
            *guard = value.map(ToString::to_string);
        }
        Ok(())
    }
}
