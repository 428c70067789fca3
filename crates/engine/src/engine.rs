//! The processing pipeline shared by every host.

use crate::{CommandGenerator, GenerateError, GenerateRequest, Generator, Result};
use gql_assist_config::{AssistConfig, FilePatterns, SettingsStore};
use gql_assist_patch::{LiveDocument, PatchApplier, PatchOutcome};
use gql_assist_schema::{CachedSchema, SchemaResolver};
use gql_assist_tracker::FingerprintTracker;
use gql_assist_types::{DocumentRef, FileKind, HostEvent};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Why a document was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `runOnSave` is off and the event was a save.
    RunOnSaveDisabled,
    /// The same text was already processed for this event.
    Unchanged,
    /// The path matches no generated kind.
    Unrecognized,
    /// Generation is switched off for this kind.
    Disabled(FileKind),
    /// The kind needs a schema and none could be loaded.
    NoSchema,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunOnSaveDisabled => f.write_str("generation on save is disabled"),
            Self::Unchanged => f.write_str("already processed"),
            Self::Unrecognized => f.write_str("not a generated file"),
            Self::Disabled(kind) => write!(f, "{kind} generation is disabled"),
            Self::NoSchema => f.write_str("no schema available"),
        }
    }
}

/// What processing a document amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Skipped(SkipReason),
    /// The generator had nothing to say about the document.
    NothingGenerated { kind: FileKind },
    Applied { kind: FileKind, patch: PatchOutcome },
}

impl ProcessOutcome {
    /// The document text was changed and saved.
    #[must_use]
    pub fn modified(&self) -> bool {
        matches!(
            self,
            Self::Applied {
                patch: PatchOutcome::Patched { .. } | PatchOutcome::Replaced { .. },
                ..
            }
        )
    }
}

struct EngineState {
    config: Arc<AssistConfig>,
    patterns: FilePatterns,
}

/// Tracker, resolver, generator and applier wired into one pipeline.
///
/// Hosts translate their events into [`Engine::process_document`] (for saves
/// and selection changes), [`Engine::generate_document`] (explicit requests)
/// and [`Engine::handle_file_event`] (file-system changes).
pub struct Engine {
    tracker: FingerprintTracker,
    resolver: Arc<SchemaResolver>,
    applier: PatchApplier,
    generator: RwLock<Arc<dyn Generator>>,
    state: RwLock<EngineState>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("tracker", &self.tracker)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(
        config: AssistConfig,
        resolver: Arc<SchemaResolver>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let patterns = FilePatterns::from_config(&config)?;
        Ok(Self {
            tracker: FingerprintTracker::new(patterns.clone()),
            resolver,
            applier: PatchApplier::default(),
            generator: RwLock::new(generator),
            state: RwLock::new(EngineState {
                config: Arc::new(config),
                patterns,
            }),
        })
    }

    /// An engine for `roots` running the configured generator command from
    /// the first root.
    pub fn for_workspace(
        roots: Vec<PathBuf>,
        config: AssistConfig,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<Self> {
        let generator = workspace_generator(&config, roots.first().map(PathBuf::as_path))?;
        let resolver = Arc::new(SchemaResolver::new(roots, &config, settings)?);
        Self::new(config, resolver, Arc::new(generator))
    }

    #[must_use]
    pub fn tracker(&self) -> &FingerprintTracker {
        &self.tracker
    }

    #[must_use]
    pub fn resolver(&self) -> &Arc<SchemaResolver> {
        &self.resolver
    }

    #[must_use]
    pub fn config(&self) -> Arc<AssistConfig> {
        Arc::clone(&self.read_state().config)
    }

    /// The generated kind `path` belongs to, if any.
    #[must_use]
    pub fn classify(&self, path: &str) -> Option<FileKind> {
        self.read_state().patterns.classify(path)
    }

    /// Globs a file watcher needs to see changes to files of `kind`.
    #[must_use]
    pub fn watch_globs(&self, kind: FileKind) -> Vec<String> {
        self.read_state().patterns.watch_globs(kind)
    }

    pub fn set_generator(&self, generator: Arc<dyn Generator>) {
        *self.generator.write().unwrap_or_else(PoisonError::into_inner) = generator;
    }

    /// Switch to a new configuration. The schema is not reloaded.
    pub async fn reload_config(&self, config: AssistConfig) -> Result<()> {
        let patterns = FilePatterns::from_config(&config)?;
        self.resolver.update_config(&config).await?;
        self.tracker.set_patterns(patterns.clone());

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.config = Arc::new(config);
        state.patterns = patterns;
        tracing::info!("Configuration reloaded");
        Ok(())
    }

    /// Run the pipeline for a save or selection event.
    ///
    /// Documents whose text was already processed for the same event are
    /// skipped, so repeated saves of an unchanged file cost one hash.
    #[tracing::instrument(skip(self, document), fields(path = document.path()))]
    pub async fn process_document(
        &self,
        document: &mut dyn LiveDocument,
        event: HostEvent,
    ) -> Result<ProcessOutcome> {
        let config = self.config();
        if event == HostEvent::Saved && !config.run_on_save {
            return Ok(ProcessOutcome::Skipped(SkipReason::RunOnSaveDisabled));
        }

        let seen = DocumentRef::new(document.path(), document.text());
        if !self
            .tracker
            .should_process(Some(seen), FileKind::Any, event.as_str())
        {
            if self.classify(document.path()).is_none() {
                return Ok(ProcessOutcome::Skipped(SkipReason::Unrecognized));
            }
            tracing::debug!("Document unchanged since last run");
            return Ok(ProcessOutcome::Skipped(SkipReason::Unchanged));
        }

        let result = self.run(document, &config).await;
        // a run that could not finish must not mark the text as handled
        if matches!(
            result,
            Ok(ProcessOutcome::Skipped(SkipReason::NoSchema)) | Err(_)
        ) {
            self.tracker.forget_event(document.path(), event.as_str());
        }
        result
    }

    /// Run the pipeline regardless of what was processed before.
    #[tracing::instrument(skip(self, document), fields(path = document.path()))]
    pub async fn generate_document(
        &self,
        document: &mut dyn LiveDocument,
    ) -> Result<ProcessOutcome> {
        let config = self.config();
        self.run(document, &config).await
    }

    /// Forward a file-system event to the resolver.
    ///
    /// Returns the newly loaded schema when the event caused a reload.
    pub async fn handle_file_event(
        &self,
        path: &Path,
        event: HostEvent,
    ) -> Result<Option<Arc<CachedSchema>>> {
        if event == HostEvent::Deleted {
            self.tracker.forget(&path.to_string_lossy());
        }
        Ok(self.resolver.handle_file_event(path, event).await?)
    }

    async fn run(
        &self,
        document: &mut dyn LiveDocument,
        config: &AssistConfig,
    ) -> Result<ProcessOutcome> {
        let Some(kind) = self.classify(document.path()) else {
            return Ok(ProcessOutcome::Skipped(SkipReason::Unrecognized));
        };
        if kind == FileKind::Schema || !config.is_enabled(kind) {
            return Ok(ProcessOutcome::Skipped(SkipReason::Disabled(kind)));
        }

        let schema = if kind.needs_schema() {
            let Some(schema) = self.resolver.get_schema().await else {
                tracing::warn!(%kind, "Skipping generation, no schema available");
                return Ok(ProcessOutcome::Skipped(SkipReason::NoSchema));
            };
            Some(schema)
        } else {
            self.resolver.cache().get()
        };

        let request = GenerateRequest {
            path: PathBuf::from(document.path()),
            text: document.text().to_string(),
            kind,
            schema,
            behaviour: config.behaviour.clone(),
        };
        let generator = Arc::clone(&*self.generator.read().unwrap_or_else(PoisonError::into_inner));

        let generated = tokio::task::spawn_blocking(move || generator.generate(&request))
            .await
            .map_err(|err| GenerateError::Interrupted(err.to_string()))??;

        let Some(new_text) = generated else {
            return Ok(ProcessOutcome::NothingGenerated { kind });
        };

        let patch = self.applier.apply_generated_text(document, &new_text)?;
        tracing::info!(%kind, outcome = ?patch, "Generated document");
        Ok(ProcessOutcome::Applied { kind, patch })
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, EngineState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The configured generator command, run from `root` when given.
pub fn workspace_generator(
    config: &AssistConfig,
    root: Option<&Path>,
) -> std::result::Result<CommandGenerator, GenerateError> {
    let generator = CommandGenerator::from_config(&config.generator)?;
    Ok(match root {
        Some(root) => generator.with_working_dir(root),
        None => generator,
    })
}
