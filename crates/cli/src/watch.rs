//! Watch mode: run the generation pipeline as files change on disk.
//!
//! Uses the `notify` crate for cross-platform file system events and
//! debounces them so an editor's write-rename-touch sequence is handled as
//! one change.

use crate::commands::generate::print_outcome;
use crate::commands::WorkspaceContext;
use crate::output::OutputOptions;
use anyhow::{Context, Result};
use colored::Colorize;
use gql_assist_config::CONFIG_FILES;
use gql_assist_engine::{workspace_generator, Engine, FileDocument, ProcessOutcome, SkipReason};
use gql_assist_types::{FileKind, HostEvent};
use notify::event::{EventKind, ModifyKind};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Debounce duration for file changes (milliseconds)
const DEBOUNCE_MS: u64 = 100;

/// Directories whose contents are never generated.
const IGNORED_DIRS: &[&str] = &["node_modules", ".git", "target", "dist"];

/// File watcher feeding changes into an [`Engine`].
pub struct FileWatcher {
    ctx: WorkspaceContext,
    engine: Engine,
    output: OutputOptions,
    watcher: RecommendedWatcher,
    rx: UnboundedReceiver<notify::Result<Event>>,
}

impl FileWatcher {
    pub fn new(ctx: WorkspaceContext, output: OutputOptions) -> Result<Self> {
        let engine = ctx.engine()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .context("Failed to create file watcher")?;

        Ok(Self {
            ctx,
            engine,
            output,
            watcher,
            rx,
        })
    }

    /// Start watching the workspace root.
    pub fn start(&mut self) -> Result<()> {
        self.watcher
            .watch(&self.ctx.root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch path: {}", self.ctx.root.display()))
    }

    /// Run the watch loop until the watcher goes away.
    pub async fn run(&mut self) -> Result<()> {
        self.print_header();

        match self.engine.resolver().resolve_and_load().await {
            Ok(schema) => self.info(&format!("Schema: {}", schema.source())),
            Err(err) => eprintln!("{} {err}", "warning:".yellow().bold()),
        }

        let mut pending: HashMap<PathBuf, HostEvent> = HashMap::new();

        loop {
            let timeout = if pending.is_empty() {
                Duration::from_secs(60)
            } else {
                Duration::from_millis(DEBOUNCE_MS)
            };

            let next = tokio::time::timeout(timeout, self.rx.recv()).await;
            match next {
                Ok(Some(Ok(event))) => {
                    for path in event.paths {
                        if is_ignored(&path) {
                            continue;
                        }
                        if let Some(host_event) = host_event(&event.kind, path.exists()) {
                            pending.insert(path, host_event);
                        }
                    }
                }
                Ok(Some(Err(e))) => {
                    eprintln!("{} {}", "Watch error:".red(), e);
                }
                Ok(None) => break,
                Err(_) => {
                    // quiet for a full debounce period
                    let mut changed: Vec<(PathBuf, HostEvent)> = pending.drain().collect();
                    changed.sort_by(|a, b| a.0.cmp(&b.0));
                    for (path, event) in changed {
                        self.handle(&path, event).await;
                    }
                }
            }
        }

        Ok(())
    }

    async fn handle(&self, path: &Path, event: HostEvent) {
        tracing::debug!(path = %path.display(), %event, "File event");
        if is_config_file(path) {
            self.reload_config().await;
            return;
        }

        match self.engine.handle_file_event(path, event).await {
            Ok(Some(schema)) => self.info(&format!("Schema reloaded from {}", schema.source())),
            Ok(None) => {}
            Err(err) => eprintln!("{} {err}", "error:".red().bold()),
        }

        if event == HostEvent::Deleted {
            return;
        }
        let Some(kind) = self.engine.classify(&path.to_string_lossy()) else {
            return;
        };
        if kind == FileKind::Schema {
            return;
        }

        let display = self.ctx.display_path(path);
        let result = match FileDocument::open(path) {
            Ok(mut document) => {
                self.engine
                    .process_document(&mut document, HostEvent::Saved)
                    .await
            }
            Err(err) => Err(err),
        };
        match result {
            Ok(outcome) => {
                if outcome.modified() || (self.output.show_info && !is_quiet_skip(&outcome)) {
                    print_outcome(&display, &outcome);
                }
            }
            Err(err) => eprintln!("{} {display}: {err}", "✗".red()),
        }
    }

    async fn reload_config(&self) {
        let reloaded = async {
            let config = self.ctx.reload_config()?;
            let generator = workspace_generator(&config, Some(&self.ctx.root))?;
            self.engine.reload_config(config).await?;
            self.engine.set_generator(Arc::new(generator));
            anyhow::Ok(())
        }
        .await;

        match reloaded {
            Ok(()) => {
                self.info("Configuration reloaded");
                if let Err(err) = self.engine.resolver().resolve_and_load().await {
                    eprintln!("{} {err}", "warning:".yellow().bold());
                }
            }
            Err(err) => eprintln!("{} {err:#}", "error:".red().bold()),
        }
    }

    fn info(&self, message: &str) {
        if self.output.show_info {
            println!("{} {message}", format!("[{}]", timestamp()).dimmed());
        }
    }

    fn print_header(&self) {
        if !self.output.show_info {
            return;
        }
        println!();
        println!(
            "{} Watching {} for changes... (press {} to stop)",
            "●".cyan(),
            self.ctx.root.display(),
            "Ctrl+C".bold()
        );
        println!();
    }
}

/// The host event a file system event amounts to for one of its paths.
fn host_event(kind: &EventKind, exists: bool) -> Option<HostEvent> {
    match kind {
        EventKind::Create(_) => Some(HostEvent::Created),
        // a rename reports both ends; which one this is shows on disk
        EventKind::Modify(ModifyKind::Name(_)) => Some(if exists {
            HostEvent::Created
        } else {
            HostEvent::Deleted
        }),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(HostEvent::Changed),
        EventKind::Remove(_) => Some(HostEvent::Deleted),
        _ => None,
    }
}

fn is_ignored(path: &Path) -> bool {
    path.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
    })
}

fn is_config_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| CONFIG_FILES.contains(&name))
}

/// Skips that would fire for every unrelated file, or for our own writes.
fn is_quiet_skip(outcome: &ProcessOutcome) -> bool {
    matches!(
        outcome,
        ProcessOutcome::Skipped(SkipReason::Unchanged | SkipReason::Unrecognized)
    )
}

fn timestamp() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
