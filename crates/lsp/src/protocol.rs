//! gql-assist extensions to the protocol: commands and custom notifications.

use gql_assist_schema::SchemaStatus;
use lsp_types::notification::Notification;
use lsp_types::Uri;
use serde::{Deserialize, Serialize};

/// Run the generator on a document now, ignoring what was processed before.
///
/// Arguments: `[uri]`.
pub const GENERATE_COMMAND: &str = "gqlAssist.generate";

/// List schema choices, or select one.
///
/// Arguments: `[{ "workspace"?: uri, "schema"?: string | null }]`. Without
/// `schema` the picker entries are returned; a string selects that path or
/// URL; `null` clears the selection.
pub const CHOOSE_SCHEMA_COMMAND: &str = "gqlAssist.chooseSchema";

/// Report the schema in use. Arguments: `[{ "workspace"?: uri }]`.
pub const SCHEMA_STATUS_COMMAND: &str = "gqlAssist.schemaStatus";

pub const COMMANDS: &[&str] = &[
    GENERATE_COMMAND,
    CHOOSE_SCHEMA_COMMAND,
    SCHEMA_STATUS_COMMAND,
];

/// Client notification: the cursor moved in a document.
pub const SELECTION_CHANGED_METHOD: &str = "gqlAssist/selectionChanged";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentParams {
    pub uri: Uri,
}

/// Server notification: the active schema of a workspace changed.
#[derive(Debug)]
pub enum SchemaStatusNotification {}

impl Notification for SchemaStatusNotification {
    type Params = SchemaStatusParams;
    const METHOD: &'static str = "gqlAssist/schemaStatus";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaStatusParams {
    pub workspace: String,
    /// Short status bar text.
    pub label: String,
    /// Path or URL of the loaded schema.
    pub source: Option<String>,
}

impl SchemaStatusParams {
    #[must_use]
    pub fn new(workspace: impl Into<String>, status: SchemaStatus) -> Self {
        Self {
            workspace: workspace.into(),
            label: status.label,
            source: status.source.map(|source| source.to_string()),
        }
    }
}

/// Server notification: the client should save a document the server just
/// edited.
#[derive(Debug)]
pub enum SaveDocumentNotification {}

impl Notification for SaveDocumentNotification {
    type Params = DocumentParams;
    const METHOD: &'static str = "gqlAssist/saveDocument";
}
