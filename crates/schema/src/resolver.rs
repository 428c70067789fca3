//! Choosing, loading and re-loading the active schema.

use crate::discovery::{find_schema_files, is_within};
use crate::{
    CachedSchema, IntrospectionClient, Result, SchemaCache, SchemaError, SchemaLoader,
    SchemaSource,
};
use gql_assist_config::{AssistConfig, FilePatterns, SettingsStore};
use gql_assist_types::{FileKind, HostEvent};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

const NO_SCHEMA_LABEL: &str = "$(warning) No schema";

/// The schema currently in use, for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaStatus {
    pub source: Option<SchemaSource>,
    pub label: String,
}

/// One entry of the schema picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SchemaChoice {
    /// A schema file found in the workspace.
    LoadSchema {
        path: PathBuf,
        label: String,
        selected: bool,
    },
    /// Ask the user for a URL or a path outside the workspace.
    Remote { label: String },
    /// Forget the persisted selection.
    Clear { label: String, current: String },
}

impl SchemaChoice {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::LoadSchema { label, .. } | Self::Remote { label } | Self::Clear { label, .. } => {
                label
            }
        }
    }
}

struct ResolverState {
    roots: Vec<PathBuf>,
    patterns: FilePatterns,
    schema_override: Option<String>,
    loader: SchemaLoader,
    candidates: Vec<PathBuf>,
    /// The last source a load was attempted from, whether or not it worked.
    attempted: Option<SchemaSource>,
}

/// Finds the active schema for a set of workspace roots and keeps
/// [`SchemaCache`] in step with it.
///
/// Preference order: the user's persisted selection, then the configured
/// `schemaOverride`, then the first schema file found under the roots.
/// Loads are serialized; the cache is only ever written from here.
pub struct SchemaResolver {
    cache: Arc<SchemaCache>,
    settings: Arc<dyn SettingsStore>,
    state: Mutex<ResolverState>,
}

impl std::fmt::Debug for SchemaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaResolver")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl SchemaResolver {
    pub fn new(
        roots: Vec<PathBuf>,
        config: &AssistConfig,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<Self> {
        let patterns = FilePatterns::from_config(config)?;
        Ok(Self {
            cache: Arc::new(SchemaCache::new()),
            settings,
            state: Mutex::new(ResolverState {
                roots,
                patterns,
                schema_override: config.schema_override.clone(),
                loader: SchemaLoader::new(IntrospectionClient::from_config(&config.introspection)),
                candidates: Vec::new(),
                attempted: None,
            }),
        })
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<SchemaCache> {
        &self.cache
    }

    /// Choose a schema and load it into the cache.
    ///
    /// On any failure the cache is cleared, so it never holds a schema other
    /// than the one that would be chosen now.
    pub async fn resolve_and_load(&self) -> Result<Arc<CachedSchema>> {
        let mut state = self.state.lock().await;
        self.resolve_locked(&mut state).await
    }

    /// The cached schema, loading it first if the cache is empty.
    ///
    /// `None` when no schema exists or it failed to load.
    pub async fn get_schema(&self) -> Option<Arc<CachedSchema>> {
        if let Some(cached) = self.cache.get() {
            return Some(cached);
        }

        let mut state = self.state.lock().await;
        // another caller may have loaded it while we waited
        if let Some(cached) = self.cache.get() {
            return Some(cached);
        }

        match self.resolve_locked(&mut state).await {
            Ok(cached) => Some(cached),
            Err(SchemaError::NoSchemaFound { .. }) => {
                tracing::debug!("No schema available");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "Schema unavailable");
                None
            }
        }
    }

    /// React to a file being created, changed or deleted.
    ///
    /// Returns `Ok(None)` when the event does not concern the schema: a
    /// non-schema file, a change to a schema file that is not the current
    /// one, or an event outside the workspace.
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    pub async fn handle_file_event(
        &self,
        path: &Path,
        event: HostEvent,
    ) -> Result<Option<Arc<CachedSchema>>> {
        if !event.is_file_system() {
            return Ok(None);
        }

        let mut state = self.state.lock().await;
        if !state
            .patterns
            .matches(&path.to_string_lossy(), FileKind::Schema)
        {
            return Ok(None);
        }

        if event == HostEvent::Changed {
            let current = state.attempted.as_ref().and_then(SchemaSource::as_path);
            if current != Some(path) {
                tracing::debug!("Ignoring change to inactive schema file");
                return Ok(None);
            }
        } else if !is_within(path, &state.roots) {
            return Ok(None);
        }

        tracing::info!(%event, "Schema file event, re-resolving");
        self.resolve_locked(&mut state).await.map(Some)
    }

    /// Persist `choice` (a path or URL; `None` clears) and reload.
    #[tracing::instrument(skip(self))]
    pub async fn select_schema(&self, choice: Option<&str>) -> Result<Arc<CachedSchema>> {
        let choice = choice.map(str::trim).filter(|c| !c.is_empty());
        self.settings.set_selected_schema(choice)?;

        let mut state = self.state.lock().await;
        self.resolve_locked(&mut state).await
    }

    /// Where the cached schema came from.
    #[must_use]
    pub fn schema_location(&self) -> Option<SchemaSource> {
        self.cache.get().map(|cached| cached.source().clone())
    }

    #[must_use]
    pub fn status(&self) -> SchemaStatus {
        match self.schema_location() {
            Some(source) => SchemaStatus {
                label: format!("$(check) {}", source.short_name()),
                source: Some(source),
            },
            None => SchemaStatus {
                source: None,
                label: NO_SCHEMA_LABEL.to_string(),
            },
        }
    }

    /// Schema files currently present under the roots, in preference order.
    pub async fn candidates(&self) -> Vec<PathBuf> {
        let mut state = self.state.lock().await;
        state.candidates = find_schema_files(&state.roots, &state.patterns);
        state.candidates.clone()
    }

    /// Entries for the schema picker: local files, remote, and clear when a
    /// selection is persisted.
    pub async fn schema_choices(&self) -> Vec<SchemaChoice> {
        let current = self.schema_location();
        let current_path = current.as_ref().and_then(SchemaSource::as_path);

        let mut choices: Vec<SchemaChoice> = self
            .candidates()
            .await
            .into_iter()
            .map(|path| {
                let selected = current_path == Some(path.as_path());
                let icon = if selected { "$(check)" } else { "$(file)" };
                let name = SchemaSource::File(path.clone()).short_name();
                SchemaChoice::LoadSchema {
                    label: format!("{icon}  {name}"),
                    path,
                    selected,
                }
            })
            .collect();

        choices.push(SchemaChoice::Remote {
            label: "$(cloud)  Remote Schema".to_string(),
        });
        if let Some(current) = self.settings.selected_schema() {
            choices.push(SchemaChoice::Clear {
                label: "$(close)  Clear Selected Schema".to_string(),
                current,
            });
        }
        choices
    }

    pub async fn roots(&self) -> Vec<PathBuf> {
        self.state.lock().await.roots.clone()
    }

    /// Replace the workspace roots. Does not reload.
    pub async fn set_roots(&self, roots: Vec<PathBuf>) {
        self.state.lock().await.roots = roots;
    }

    /// Apply a new configuration. Does not reload.
    pub async fn update_config(&self, config: &AssistConfig) -> Result<()> {
        let patterns = FilePatterns::from_config(config)?;
        let mut state = self.state.lock().await;
        state.patterns = patterns;
        state.schema_override.clone_from(&config.schema_override);
        state.loader = SchemaLoader::new(IntrospectionClient::from_config(&config.introspection));
        Ok(())
    }

    fn choose(&self, state: &ResolverState) -> Option<SchemaSource> {
        let root = state.roots.first().map(PathBuf::as_path);

        if let Some(selected) = self.settings.selected_schema() {
            tracing::debug!(%selected, "Using selected schema");
            return Some(SchemaSource::parse(&selected, root));
        }
        if let Some(ref configured) = state.schema_override {
            tracing::debug!(%configured, "Using configured schema");
            return Some(SchemaSource::parse(configured, root));
        }
        state.candidates.first().cloned().map(SchemaSource::File)
    }

    async fn resolve_locked(&self, state: &mut ResolverState) -> Result<Arc<CachedSchema>> {
        state.candidates = find_schema_files(&state.roots, &state.patterns);

        let Some(source) = self.choose(state) else {
            self.cache.clear();
            state.attempted = None;
            tracing::info!(roots = state.roots.len(), "No schema found");
            return Err(SchemaError::NoSchemaFound {
                roots: state.roots.clone(),
            });
        };

        state.attempted = Some(source.clone());
        match state.loader.load(&source).await {
            Ok((schema, sdl)) => Ok(self.cache.set(schema, source, sdl)),
            Err(err) => {
                self.cache.clear();
                tracing::warn!(%source, error = %err, "Failed to load schema");
                Err(err)
            }
        }
    }
}
