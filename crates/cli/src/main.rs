mod commands;
mod exit_code;
mod output;
mod watch;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::WorkspaceContext;
use exit_code::ExitCode;
use output::OutputOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gql-assist")]
#[command(about = "Keep GraphQL-derived sources in sync with their schema", long_about = None)]
#[command(version)]
struct Cli {
    /// Workspace root (defaults to the current directory)
    #[arg(short, long, value_name = "DIR", global = true)]
    root: Option<PathBuf>,

    /// Use this config file instead of searching upward from the root
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Always color output
    #[arg(long, global = true, conflicts_with = "no_color")]
    color: bool,

    /// Never color output
    #[arg(long, global = true, conflicts_with = "color")]
    no_color: bool,

    /// Only print errors and files that changed
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the workspace and regenerate files as they change
    Watch,

    /// Run the generator on the given files
    Generate {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Generate even when `runOnSave` is disabled
        #[arg(short, long)]
        force: bool,
    },

    /// Inspect and select the schema used for generation
    Schema {
        #[command(subcommand)]
        command: commands::schema::SchemaCommands,
    },

    /// Start the language server on stdio
    Lsp,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // the server installs its own stderr subscriber
    if matches!(cli.command, Commands::Lsp) {
        return commands::lsp::run().await;
    }

    #[cfg(feature = "otel")]
    let telemetry = init_logging();
    #[cfg(not(feature = "otel"))]
    init_logging();

    output::configure_colors(cli.color, cli.no_color);

    let output = OutputOptions {
        show_info: !cli.quiet,
    };
    let result = run(cli, output).await;

    #[cfg(feature = "otel")]
    if let Some(provider) = telemetry {
        if let Err(err) = provider.shutdown() {
            eprintln!("Failed to flush traces: {err}");
        }
    }

    if let Err(err) = result {
        eprintln!("{} {err:#}", "error:".red().bold());
        ExitCode::for_error(&err).exit();
    }
    Ok(())
}

async fn run(cli: Cli, output: OutputOptions) -> anyhow::Result<()> {
    let ctx = WorkspaceContext::load(cli.root, cli.config)?;

    match cli.command {
        Commands::Watch => commands::watch::run(ctx, output).await,
        Commands::Generate { files, force } => {
            commands::generate::run(&ctx, &files, force, output).await
        }
        Commands::Schema { command } => commands::schema::run(&ctx, command).await,
        Commands::Lsp => commands::lsp::run().await,
    }
}

fn env_filter(default: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
}

/// Log to stderr, silent unless `RUST_LOG` is set.
fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("off"))
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(not(feature = "otel"))]
fn init_logging() {
    init_stderr_logging();
}

/// Log to stderr and, when `OTEL_TRACES_ENABLED` is set, export spans over
/// OTLP. The returned provider must be shut down to flush pending spans.
#[cfg(feature = "otel")]
fn init_logging() -> Option<opentelemetry_sdk::trace::SdkTracerProvider> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::SdkTracerProvider;
    use opentelemetry_sdk::Resource;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let enabled = std::env::var("OTEL_TRACES_ENABLED")
        .is_ok_and(|value| value == "1" || value.eq_ignore_ascii_case("true"));
    if !enabled {
        init_stderr_logging();
        return None;
    }

    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build();
    let exporter = match exporter {
        Ok(exporter) => exporter,
        Err(err) => {
            eprintln!("OTLP exporter unavailable ({err}); tracing to stderr only");
            init_stderr_logging();
            return None;
        }
    };

    let provider = SdkTracerProvider::builder()
        .with_resource(Resource::builder().with_service_name("gql-assist").build())
        .with_batch_exporter(exporter)
        .build();
    opentelemetry::global::set_tracer_provider(provider.clone());

    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(tracing_opentelemetry::layer().with_tracer(provider.tracer("gql-assist")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    tracing::info!(%endpoint, "Exporting traces");

    Some(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "gql-assist",
            "--root",
            "/work",
            "generate",
            "--force",
            "a.model.ts",
            "b.gql.ts",
        ])
        .unwrap();

        assert_eq!(cli.root, Some(PathBuf::from("/work")));
        let Commands::Generate { files, force } = cli.command else {
            panic!("expected generate");
        };
        assert!(force);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_generate_needs_files() {
        assert!(Cli::try_parse_from(["gql-assist", "generate"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gql-assist", "watch", "--quiet", "--no-color"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.no_color);
        assert!(matches!(cli.command, Commands::Watch));
    }

    #[test]
    fn test_parse_schema_select() {
        let cli =
            Cli::try_parse_from(["gql-assist", "schema", "select", "https://api.dev/graphql"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Schema {
                command: commands::schema::SchemaCommands::Select { ref schema }
            } if schema == "https://api.dev/graphql"
        ));
    }

    #[test]
    fn test_color_flags_conflict() {
        assert!(Cli::try_parse_from(["gql-assist", "--color", "--no-color", "watch"]).is_err());
    }
}
