//! gql-assist language server.
//!
//! Runs the generation pipeline when documents are saved, keeps the schema
//! in step with the workspace through file watchers, and sends the
//! resulting edits to the client. It's typically invoked via
//! `gql-assist lsp`.

mod conversions;
mod document;
mod protocol;
mod server;
mod workspace;

pub use document::EditorDocument;
pub use protocol::{
    DocumentParams, SaveDocumentNotification, SchemaStatusNotification, SchemaStatusParams,
    CHOOSE_SCHEMA_COMMAND, COMMANDS, GENERATE_COMMAND, SCHEMA_STATUS_COMMAND,
    SELECTION_CHANGED_METHOD,
};
pub use server::AssistLanguageServer;

use tower_lsp_server::{LspService, Server};

/// Filter from `RUST_LOG`, `info` when unset.
fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// stdout carries JSON-RPC, so logs go to stderr without color codes.
fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
}

/// Install a subscriber that also exports spans over OTLP. Returns `false`
/// when the exporter can't be built or a subscriber is already installed.
#[cfg(feature = "otel")]
fn try_init_otel() -> bool {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::SdkTracerProvider;
    use opentelemetry_sdk::Resource;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build();
    let Ok(exporter) = exporter else {
        return false;
    };

    let provider = SdkTracerProvider::builder()
        .with_resource(Resource::builder().with_service_name("gql-assist-lsp").build())
        .with_batch_exporter(exporter)
        .build();
    let installed = tracing_subscriber::registry()
        .with(env_filter())
        .with(stderr_layer())
        .with(tracing_opentelemetry::layer().with_tracer(provider.tracer("gql-assist-lsp")))
        .try_init()
        .is_ok();

    if installed {
        opentelemetry::global::set_tracer_provider(provider);
        tracing::info!(%endpoint, "Exporting traces");
    }
    installed
}

/// Initialize tracing for the server.
///
/// With the `otel` feature and `OTEL_TRACES_ENABLED` set, spans are also
/// exported over OTLP. Does nothing if a global subscriber is already
/// installed.
pub fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    #[cfg(feature = "otel")]
    if std::env::var_os("OTEL_TRACES_ENABLED").is_some() && try_init_otel() {
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(stderr_layer())
        .try_init();
}

/// Run the language server over stdio.
///
/// ```ignore
/// #[tokio::main]
/// async fn main() {
///     gql_assist_lsp::run_server().await;
/// }
/// ```
pub async fn run_server() {
    init_tracing();

    let (service, socket) = LspService::build(AssistLanguageServer::new)
        .custom_method(
            SELECTION_CHANGED_METHOD,
            AssistLanguageServer::selection_changed,
        )
        .finish();

    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}
