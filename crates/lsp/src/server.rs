#![allow(clippy::significant_drop_tightening)]

use crate::conversions::{config_from_settings, full_range, host_event};
use crate::document::EditorDocument;
use crate::protocol::{
    DocumentParams, SaveDocumentNotification, SchemaStatusNotification, SchemaStatusParams,
    CHOOSE_SCHEMA_COMMAND, COMMANDS, GENERATE_COMMAND, SCHEMA_STATUS_COMMAND,
};
use crate::workspace::{self, Workspace};
use dashmap::DashMap;
use gql_assist_config::{AssistConfig, CONFIG_FILES};
use gql_assist_engine::{EngineError, ProcessOutcome};
use gql_assist_patch::LiveDocument;
use gql_assist_schema::{CachedSchema, SchemaError};
use gql_assist_types::{FileKind, HostEvent};
use lsp_types::{
    ApplyWorkspaceEditResponse, DidChangeConfigurationParams, DidChangeTextDocumentParams,
    DidChangeWatchedFilesParams, DidChangeWatchedFilesRegistrationOptions,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, DidSaveTextDocumentParams,
    DocumentChanges, ExecuteCommandOptions, ExecuteCommandParams, FileSystemWatcher, GlobPattern,
    InitializeParams, InitializeResult, InitializedParams, MessageType, OneOf,
    OptionalVersionedTextDocumentIdentifier, Registration, ServerCapabilities, ServerInfo,
    TextDocumentEdit, TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TextDocumentSyncSaveOptions, TextEdit, Uri, WatchKind, WorkDoneProgressOptions, WorkspaceEdit,
};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_lsp_server::jsonrpc::{Error, Result};
use tower_lsp_server::{Client, LanguageServer, UriExt};

/// A document open in the client, as last synchronized.
#[derive(Debug, Clone)]
struct OpenDocument {
    version: i32,
    text: String,
}

pub struct AssistLanguageServer {
    client: Client,
    /// Workspace folders from initialization, loaded once the client is ready
    init_workspace_folders: DashMap<String, PathBuf>,
    /// Settings from `initializationOptions`
    init_settings: Mutex<Option<AssistConfig>>,
    /// Loaded workspaces indexed by root path
    workspaces: DashMap<PathBuf, Arc<Workspace>>,
    /// Open documents indexed by URI string
    documents: DashMap<String, OpenDocument>,
}

impl AssistLanguageServer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            init_workspace_folders: DashMap::new(),
            init_settings: Mutex::new(None),
            workspaces: DashMap::new(),
            documents: DashMap::new(),
        }
    }

    /// `gqlAssist/selectionChanged`: the cursor moved in `params.uri`.
    pub async fn selection_changed(&self, params: DocumentParams) {
        let Some(path) = params.uri.to_file_path() else {
            return;
        };
        let path = path.into_owned();
        let Some(workspace) = self.workspace_for(&path) else {
            return;
        };
        self.run_pipeline(&workspace, &params.uri, &path, Some(HostEvent::SelectionMoved))
            .await;
    }

    fn workspace_for(&self, path: &Path) -> Option<Arc<Workspace>> {
        let all: Vec<Arc<Workspace>> = self
            .workspaces
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        workspace::closest(&all, path)
    }

    /// The workspace named by a command's `workspace` argument, or the
    /// first one by root when none is named.
    fn workspace_for_args(&self, args: Option<&Value>) -> Option<Arc<Workspace>> {
        let named = args
            .and_then(|args| args.get("workspace"))
            .and_then(Value::as_str);
        if let Some(uri) = named {
            let path = Uri::from_str(uri).ok()?.to_file_path()?.into_owned();
            return self.workspace_for(&path);
        }
        self.workspaces
            .iter()
            .min_by(|a, b| a.key().cmp(b.key()))
            .map(|entry| Arc::clone(entry.value()))
    }

    async fn load_workspace(
        &self,
        root: PathBuf,
        folders: &[PathBuf],
        settings: Option<AssistConfig>,
    ) {
        match Workspace::load(root.clone(), folders, settings) {
            Ok(workspace) => {
                let workspace = Arc::new(workspace);
                self.workspaces.insert(root, Arc::clone(&workspace));
                if let Some(config) = workspace.config_path() {
                    self.client
                        .log_message(
                            MessageType::INFO,
                            format!("Using config {}", config.display()),
                        )
                        .await;
                }
                let result = workspace.engine().resolver().resolve_and_load().await;
                self.report_schema(&workspace, result).await;
            }
            Err(err) => {
                tracing::error!(root = %root.display(), error = %err, "Failed to load workspace");
                self.client
                    .show_message(
                        MessageType::ERROR,
                        format!("gql-assist: failed to load {}: {err}", root.display()),
                    )
                    .await;
            }
        }
    }

    /// Tell the user about a schema (re)load and publish the new status.
    async fn report_schema(
        &self,
        workspace: &Workspace,
        result: std::result::Result<Arc<CachedSchema>, SchemaError>,
    ) {
        match result {
            Ok(schema) => {
                let message = format!("Loaded schema from {}", schema.source());
                tracing::info!("{message}");
                self.client.log_message(MessageType::INFO, message).await;
            }
            Err(err @ SchemaError::NoSchemaFound { .. }) => {
                tracing::warn!(error = %err, "No schema");
                self.client
                    .log_message(MessageType::WARNING, err.to_string())
                    .await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Schema failed to load");
                self.client
                    .show_message(MessageType::ERROR, format!("gql-assist: {err}"))
                    .await;
            }
        }
        self.publish_status(workspace).await;
    }

    async fn publish_status(&self, workspace: &Workspace) {
        let status = workspace.engine().resolver().status();
        self.client
            .send_notification::<SchemaStatusNotification>(SchemaStatusParams::new(
                workspace.root().display().to_string(),
                status,
            ))
            .await;
    }

    /// Run `uri` through the pipeline and send the resulting edits.
    ///
    /// `event` of `None` forces generation. Documents that are not open are
    /// read from disk.
    async fn run_pipeline(
        &self,
        workspace: &Workspace,
        uri: &Uri,
        path: &Path,
        event: Option<HostEvent>,
    ) -> Option<ProcessOutcome> {
        let open = self
            .documents
            .get(uri.as_str())
            .map(|entry| entry.value().clone());
        let (version, text) = match open {
            Some(doc) => (Some(doc.version), doc.text),
            None => match tokio::fs::read_to_string(path).await {
                Ok(text) => (None, text),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Cannot read document");
                    return None;
                }
            },
        };

        let mut document = EditorDocument::new(path.to_string_lossy(), text);
        let engine = workspace.engine();
        let result = match event {
            Some(event) => engine.process_document(&mut document, event).await,
            None => engine.generate_document(&mut document).await,
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report_pipeline_error(path, &err).await;
                return None;
            }
        };

        if document.is_modified() {
            self.send_edits(uri, version, &document).await;
        }
        if document.save_requested() {
            self.client
                .send_notification::<SaveDocumentNotification>(DocumentParams { uri: uri.clone() })
                .await;
        }
        Some(outcome)
    }

    async fn report_pipeline_error(&self, path: &Path, err: &EngineError) {
        tracing::error!(path = %path.display(), error = %err, "Generation failed");
        self.client
            .log_message(
                MessageType::ERROR,
                format!("Generation failed for {}: {err}", path.display()),
            )
            .await;
    }

    /// Send the document's edits against the version they were computed
    /// from. If the client refuses them, replace the whole document instead.
    async fn send_edits(&self, uri: &Uri, version: Option<i32>, document: &EditorDocument) {
        let edits = document.text_edits();
        let edit = match version {
            Some(version) => WorkspaceEdit {
                document_changes: Some(DocumentChanges::Edits(vec![TextDocumentEdit {
                    text_document: OptionalVersionedTextDocumentIdentifier {
                        uri: uri.clone(),
                        version: Some(version),
                    },
                    edits: edits.into_iter().map(OneOf::Left).collect(),
                }])),
                ..WorkspaceEdit::default()
            },
            None => unversioned(uri, edits),
        };

        match self.client.apply_edit(edit).await {
            Ok(ApplyWorkspaceEditResponse { applied: true, .. }) => return,
            Ok(response) => {
                tracing::warn!(reason = ?response.failure_reason, "Client rejected edits");
            }
            Err(err) => {
                tracing::warn!(error = %err, "applyEdit request failed");
            }
        }

        // the buffer may have moved on since; replace whatever it holds now
        let current = self
            .documents
            .get(uri.as_str())
            .map(|entry| entry.value().text.clone());
        let range = full_range(current.as_deref().unwrap_or_default());
        let replace = unversioned(uri, vec![TextEdit::new(range, document.text().to_string())]);
        match self.client.apply_edit(replace).await {
            Ok(ApplyWorkspaceEditResponse { applied: true, .. }) => {
                tracing::info!("Replaced document content");
            }
            Ok(response) => {
                tracing::error!(reason = ?response.failure_reason, "Client rejected replacement");
            }
            Err(err) => {
                tracing::error!(error = %err, "applyEdit request failed");
            }
        }
    }

    fn file_watchers(&self) -> Vec<FileSystemWatcher> {
        let mut globs: Vec<String> = Vec::new();
        for entry in &self.workspaces {
            for glob in entry.value().engine().watch_globs(FileKind::Schema) {
                if !globs.contains(&glob) {
                    globs.push(glob);
                }
            }
        }
        globs.extend(CONFIG_FILES.iter().map(|name| format!("**/{name}")));

        globs
            .into_iter()
            .map(|glob| FileSystemWatcher {
                glob_pattern: GlobPattern::String(glob),
                kind: Some(WatchKind::all()),
            })
            .collect()
    }

    async fn generate_command(&self, args: &[Value]) -> Result<Option<Value>> {
        let uri = args
            .first()
            .and_then(Value::as_str)
            .and_then(|uri| Uri::from_str(uri).ok())
            .ok_or_else(|| Error::invalid_params("expected a document URI"))?;
        let path = uri
            .to_file_path()
            .ok_or_else(|| Error::invalid_params("expected a file URI"))?
            .into_owned();
        let Some(workspace) = self.workspace_for(&path) else {
            return Err(Error::invalid_params(format!(
                "{} is outside every workspace",
                path.display()
            )));
        };

        let outcome = self.run_pipeline(&workspace, &uri, &path, None).await;
        Ok(Some(serde_json::json!({
            "modified": outcome.as_ref().is_some_and(ProcessOutcome::modified),
            "message": outcome.as_ref().map_or_else(|| "generation failed".to_string(), describe),
        })))
    }

    async fn choose_schema_command(&self, args: &[Value]) -> Result<Option<Value>> {
        let args = args.first();
        let workspace = self
            .workspace_for_args(args)
            .ok_or_else(|| Error::invalid_params("no workspace"))?;
        let resolver = workspace.engine().resolver();

        let choice = match args.and_then(|args| args.get("schema")) {
            None => {
                let choices = resolver.schema_choices().await;
                return Ok(Some(serde_json::to_value(choices).map_err(|_| Error::internal_error())?));
            }
            Some(Value::Null) => None,
            Some(Value::String(choice)) => Some(choice.as_str()),
            Some(_) => return Err(Error::invalid_params("schema must be a string or null")),
        };

        let result = resolver.select_schema(choice).await;
        if let Err(SchemaError::Config(err)) = &result {
            return Err(Error::invalid_params(err.to_string()));
        }
        self.report_schema(&workspace, result).await;
        Ok(Some(
            serde_json::to_value(resolver.status()).map_err(|_| Error::internal_error())?,
        ))
    }

    fn schema_status_command(&self, args: &[Value]) -> Result<Option<Value>> {
        let workspace = self
            .workspace_for_args(args.first())
            .ok_or_else(|| Error::invalid_params("no workspace"))?;
        let status = workspace.engine().resolver().status();
        Ok(Some(
            serde_json::to_value(status).map_err(|_| Error::internal_error())?,
        ))
    }
}

fn unversioned(uri: &Uri, edits: Vec<TextEdit>) -> WorkspaceEdit {
    WorkspaceEdit {
        changes: Some(HashMap::from([(uri.clone(), edits)])),
        ..WorkspaceEdit::default()
    }
}

fn describe(outcome: &ProcessOutcome) -> String {
    match outcome {
        ProcessOutcome::Skipped(reason) => format!("skipped: {reason}"),
        ProcessOutcome::NothingGenerated { kind } => format!("nothing to generate for {kind}"),
        ProcessOutcome::Applied { kind, patch } => format!("{kind}: {patch:?}"),
    }
}

impl LanguageServer for AssistLanguageServer {
    #[tracing::instrument(skip(self, params))]
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("Initializing gql-assist language server");

        if let Some(ref folders) = params.workspace_folders {
            tracing::info!(count = folders.len(), "Workspace folders");
            for folder in folders {
                if let Some(path) = folder.uri.to_file_path() {
                    self.init_workspace_folders
                        .insert(folder.uri.to_string(), path.into_owned());
                }
            }
        } else {
            #[allow(deprecated)]
            let root_uri = params.root_uri.as_ref();
            if let Some(path) = root_uri.and_then(UriExt::to_file_path) {
                self.init_workspace_folders
                    .insert(path.display().to_string(), path.into_owned());
            }
        }

        if let Some(options) = params.initialization_options.as_ref() {
            match config_from_settings(options) {
                Some(Ok(config)) => *self.init_settings.lock().await = Some(config),
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "Ignoring invalid initialization options");
                }
                None => {}
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                        ..TextDocumentSyncOptions::default()
                    },
                )),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: COMMANDS.iter().map(ToString::to_string).collect(),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: "gql-assist".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        let version = env!("CARGO_PKG_VERSION");
        tracing::info!(version, "gql-assist language server initialized");
        self.client
            .log_message(MessageType::INFO, format!("gql-assist v{version} ready"))
            .await;

        let settings = self.init_settings.lock().await.clone();
        let mut roots: Vec<PathBuf> = self
            .init_workspace_folders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        roots.sort();
        for root in &roots {
            self.load_workspace(root.clone(), &roots, settings.clone()).await;
        }

        let watchers = self.file_watchers();
        tracing::info!(count = watchers.len(), "Registering file watchers");
        let registration = Registration {
            id: "gql-assist-watcher".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: serde_json::to_value(DidChangeWatchedFilesRegistrationOptions {
                watchers,
            })
            .ok(),
        };

        if let Err(e) = self.client.register_capability(vec![registration]).await {
            tracing::error!("Failed to register file watchers: {:?}", e);
        }
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down gql-assist language server");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        tracing::debug!(uri = doc.uri.as_str(), "Document opened");
        self.documents.insert(
            doc.uri.to_string(),
            OpenDocument {
                version: doc.version,
                text: doc.text,
            },
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // full sync: the last change holds the whole text
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        self.documents.insert(
            params.text_document.uri.to_string(),
            OpenDocument {
                version: params.text_document.version,
                text: change.text,
            },
        );
    }

    #[tracing::instrument(skip(self, params), fields(uri = params.text_document.uri.as_str()))]
    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some(text) = params.text {
            if let Some(mut doc) = self.documents.get_mut(uri.as_str()) {
                doc.text = text;
            }
        }

        let Some(path) = uri.to_file_path() else {
            return;
        };
        let path = path.into_owned();
        let Some(workspace) = self.workspace_for(&path) else {
            tracing::debug!("Saved document is outside every workspace");
            return;
        };

        if let Some(outcome) = self
            .run_pipeline(&workspace, &uri, &path, Some(HostEvent::Saved))
            .await
        {
            tracing::debug!(outcome = %describe(&outcome), "Processed save");
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!(uri = uri.as_str(), "Document closed");
        self.documents.remove(uri.as_str());

        if let Some(path) = uri.to_file_path() {
            if let Some(workspace) = self.workspace_for(&path) {
                workspace.engine().tracker().forget(&path.to_string_lossy());
            }
        }
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        tracing::debug!("Watched files changed: {} file(s)", params.changes.len());

        for change in params.changes {
            let Some(path) = change.uri.to_file_path() else {
                tracing::warn!("Failed to convert URI to file path: {:?}", change.uri);
                continue;
            };
            let path = path.into_owned();
            let Some(event) = host_event(change.typ) else {
                continue;
            };

            let workspaces: Vec<Arc<Workspace>> = self
                .workspaces
                .iter()
                .map(|entry| Arc::clone(entry.value()))
                .collect();

            for workspace in workspaces
                .iter()
                .filter(|workspace| workspace.is_config_file(&path))
            {
                tracing::info!(path = %path.display(), %event, "Config file changed");
                if let Err(err) = workspace.reload_from_disk().await {
                    tracing::error!(error = %err, "Failed to reload config");
                    self.client
                        .show_message(MessageType::ERROR, format!("gql-assist: {err}"))
                        .await;
                    continue;
                }
                let result = workspace.engine().resolver().resolve_and_load().await;
                self.report_schema(workspace, result).await;
            }

            // every folder searches every other folder for its schema
            for workspace in &workspaces {
                match workspace.engine().handle_file_event(&path, event).await {
                    Ok(None) => {}
                    Ok(Some(schema)) => self.report_schema(workspace, Ok(schema)).await,
                    Err(EngineError::Schema(err)) => self.report_schema(workspace, Err(err)).await,
                    Err(err) => tracing::error!(error = %err, "Failed to handle file event"),
                }
            }
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let config = match config_from_settings(&params.settings) {
            None => return,
            Some(Ok(config)) => config,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "Invalid settings");
                self.client
                    .show_message(MessageType::ERROR, format!("gql-assist: invalid settings: {err}"))
                    .await;
                return;
            }
        };

        let workspaces: Vec<Arc<Workspace>> = self
            .workspaces
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for workspace in workspaces {
            if let Err(err) = workspace.apply_config(config.clone()).await {
                tracing::error!(error = %err, "Failed to apply settings");
                self.client
                    .show_message(MessageType::ERROR, format!("gql-assist: {err}"))
                    .await;
                continue;
            }
            let result = workspace.engine().resolver().resolve_and_load().await;
            self.report_schema(&workspace, result).await;
        }
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        tracing::info!("Execute command requested: {}", params.command);

        match params.command.as_str() {
            GENERATE_COMMAND => self.generate_command(&params.arguments).await,
            CHOOSE_SCHEMA_COMMAND => self.choose_schema_command(&params.arguments).await,
            SCHEMA_STATUS_COMMAND => self.schema_status_command(&params.arguments),
            other => {
                tracing::warn!("Unknown command: {}", other);
                Ok(None)
            }
        }
    }
}
