//! Configuration for gql-assist.
//!
//! The configuration is a single camelCase document, read from a
//! `.gqlassistrc*` or `gql-assist.config.*` file found by walking up from the
//! workspace root, or handed over by the editor as LSP settings. Every key has
//! a default, so an absent file is a valid configuration.
//!
//! Besides the raw [`AssistConfig`], this crate owns the two things derived
//! from it that the rest of the workspace consumes: the per-kind
//! [`FilePatterns`] and the persisted [`SettingsStore`] holding the user's
//! explicit schema selection.

mod config;
mod error;
mod loader;
mod patterns;
mod settings;

pub use config::{
    AssistConfig, BehaviourConfig, GeneratorConfig, IntrospectionConfig, KindConfig,
    ReactHookConfig,
};
pub use error::{ConfigError, Result};
pub use loader::{find_config, load_config, load_config_from_str, load_or_default, CONFIG_FILES};
pub use patterns::FilePatterns;
pub use settings::{MemorySettings, SettingsStore, WorkspaceSettings, SETTINGS_DIR, SETTINGS_FILE};
