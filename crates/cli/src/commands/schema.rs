//! Schema-related CLI commands.

use super::WorkspaceContext;
use crate::exit_code::ExitCode;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use gql_assist_schema::{CachedSchema, SchemaChoice, SchemaError, SchemaResolver};
use std::sync::Arc;

/// Schema subcommands.
#[derive(Subcommand)]
pub enum SchemaCommands {
    /// Show which schema is in use and whether it loads
    Status,

    /// List the schema files found in the workspace
    List,

    /// Select the schema to use, by path or `http(s)://` URL
    ///
    /// The selection is stored in `.gql-assist/settings.json` and takes
    /// precedence over `schemaOverride` and discovered files.
    Select {
        #[arg(value_name = "PATH_OR_URL")]
        schema: String,
    },

    /// Forget the selected schema
    Clear,
}

/// Run a schema subcommand.
pub async fn run(ctx: &WorkspaceContext, command: SchemaCommands) -> Result<()> {
    let resolver = ctx.resolver()?;

    match command {
        SchemaCommands::Status => {
            let result = resolver.resolve_and_load().await;
            report(&result);
            if result.is_err() {
                ExitCode::SchemaError.exit();
            }
        }
        SchemaCommands::List => list(ctx, &resolver).await,
        SchemaCommands::Select { schema } => {
            let result = match resolver.select_schema(Some(&schema)).await {
                Err(SchemaError::Config(err)) => {
                    return Err(err).context("Failed to save the selected schema");
                }
                other => other,
            };
            println!("{} Selected {}", "✓".green(), schema.bold());
            report(&result);
            if result.is_err() {
                ExitCode::SchemaError.exit();
            }
        }
        SchemaCommands::Clear => {
            let result = match resolver.select_schema(None).await {
                Err(SchemaError::Config(err)) => {
                    return Err(err).context("Failed to clear the selected schema");
                }
                other => other,
            };
            println!("{} Cleared the selected schema", "✓".green());
            report(&result);
        }
    }
    Ok(())
}

async fn list(ctx: &WorkspaceContext, resolver: &SchemaResolver) {
    // load first so the active file is marked
    let _ = resolver.get_schema().await;

    let choices = resolver.schema_choices().await;
    let mut files = 0usize;
    for choice in &choices {
        match choice {
            SchemaChoice::LoadSchema { path, selected, .. } => {
                files += 1;
                let display = ctx.display_path(path);
                if *selected {
                    println!("{} {}", "*".green(), display.green());
                } else {
                    println!("  {display}");
                }
            }
            SchemaChoice::Clear { current, .. } => {
                println!("\n{} {current}", "selected:".dimmed());
            }
            SchemaChoice::Remote { .. } => {}
        }
    }

    if files == 0 {
        println!("{}", "No schema files found".yellow());
    }
    if let Some(source) = resolver.schema_location().filter(|source| source.is_remote()) {
        println!("{} {source}", "remote:".dimmed());
    }
}

fn report(result: &Result<Arc<CachedSchema>, SchemaError>) {
    match result {
        Ok(schema) => {
            let index = schema.index();
            println!(
                "{} Schema loaded from {} ({} types)",
                "✓".green(),
                schema.source().to_string().bold(),
                index.len()
            );
        }
        Err(err @ SchemaError::NoSchemaFound { .. }) => {
            eprintln!("{} {err}", "warning:".yellow().bold());
        }
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
        }
    }
}
