pub mod generate;
pub mod lsp;
pub mod schema;
pub mod watch;

use anyhow::{Context, Result};
use gql_assist_config::{load_config, load_or_default, AssistConfig, WorkspaceSettings};
use gql_assist_engine::Engine;
use gql_assist_schema::SchemaResolver;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a command runs and with which configuration.
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    pub root: PathBuf,
    pub config: AssistConfig,
    pub config_path: Option<PathBuf>,
}

impl WorkspaceContext {
    /// Resolve the root (default: current directory) and load its config,
    /// from `config_path` when given or by discovery otherwise.
    pub fn load(root: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let root = root
            .canonicalize()
            .with_context(|| format!("Workspace root not found: {}", root.display()))?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let config = load_config(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?;
                (config, Some(path))
            }
            None => load_or_default(&root).context("Failed to load config")?,
        };

        Ok(Self {
            root,
            config,
            config_path,
        })
    }

    /// Re-read the config this context was loaded from.
    pub fn reload_config(&self) -> Result<AssistConfig> {
        match &self.config_path {
            Some(path) => load_config(path)
                .with_context(|| format!("Failed to load config from {}", path.display())),
            None => Ok(load_or_default(&self.root)
                .context("Failed to load config")?
                .0),
        }
    }

    fn settings(&self) -> Arc<WorkspaceSettings> {
        Arc::new(WorkspaceSettings::new(&self.root))
    }

    pub fn engine(&self) -> Result<Engine> {
        Engine::for_workspace(vec![self.root.clone()], self.config.clone(), self.settings())
            .context("Failed to set up the generation pipeline")
    }

    pub fn resolver(&self) -> Result<SchemaResolver> {
        SchemaResolver::new(vec![self.root.clone()], &self.config, self.settings())
            .context("Failed to set up schema resolution")
    }

    /// `path` relative to the root when it is inside it.
    pub fn display_path<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
    }
}
