//! One-shot generation for a list of files.

use super::WorkspaceContext;
use crate::exit_code::ExitCode;
use crate::output::OutputOptions;
use anyhow::Result;
use colored::Colorize;
use gql_assist_engine::{Engine, FileDocument, ProcessOutcome, SkipReason};
use gql_assist_patch::PatchOutcome;
use gql_assist_types::HostEvent;
use std::path::{Path, PathBuf};

/// Run the pipeline on each of `files`.
///
/// Files are processed as if saved, so `runOnSave: false` skips them;
/// `force` generates regardless.
pub async fn run(
    ctx: &WorkspaceContext,
    files: &[PathBuf],
    force: bool,
    output: OutputOptions,
) -> Result<()> {
    let engine = ctx.engine()?;
    let mut failures = 0usize;

    for file in files {
        let path = absolute(&ctx.root, file);
        let display = ctx.display_path(&path);
        match generate_file(&engine, &path, force).await {
            Ok(outcome) => {
                if output.show_info || outcome.modified() {
                    print_outcome(&display, &outcome);
                }
            }
            Err(err) => {
                failures += 1;
                eprintln!("{} {display}: {err:#}", "✗".red());
            }
        }
    }

    if failures > 0 {
        eprintln!(
            "\n{} {failures} of {} file(s) failed",
            "error:".red().bold(),
            files.len()
        );
        ExitCode::GenerateError.exit();
    }
    Ok(())
}

async fn generate_file(engine: &Engine, path: &Path, force: bool) -> Result<ProcessOutcome> {
    let mut document = FileDocument::open(path)?;
    let outcome = if force {
        engine.generate_document(&mut document).await?
    } else {
        engine
            .process_document(&mut document, HostEvent::Saved)
            .await?
    };
    Ok(outcome)
}

fn absolute(root: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| root.join(file), |cwd| cwd.join(file))
    }
}

/// One line summarizing what happened to `path`.
pub fn describe_outcome(outcome: &ProcessOutcome) -> String {
    match outcome {
        ProcessOutcome::Skipped(reason) => format!("skipped ({reason})"),
        ProcessOutcome::NothingGenerated { kind } => format!("{kind}: nothing to generate"),
        ProcessOutcome::Applied { kind, patch } => match patch {
            PatchOutcome::Unchanged => format!("{kind}: up to date"),
            PatchOutcome::Patched { actions } => format!("{kind}: updated ({actions} edit(s))"),
            PatchOutcome::Replaced { reason } => format!("{kind}: rewritten ({reason})"),
        },
    }
}

pub fn print_outcome(path: &str, outcome: &ProcessOutcome) {
    let marker = match outcome {
        _ if outcome.modified() => "✓".green(),
        ProcessOutcome::Skipped(SkipReason::NoSchema) => "!".yellow(),
        _ => "·".dimmed(),
    };
    println!("{marker} {path} {}", describe_outcome(outcome).dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use gql_assist_types::FileKind;

    #[test]
    fn test_describe_outcome() {
        assert_eq!(
            describe_outcome(&ProcessOutcome::Skipped(SkipReason::Unrecognized)),
            "skipped (not a generated file)"
        );
        assert_eq!(
            describe_outcome(&ProcessOutcome::Applied {
                kind: FileKind::Model,
                patch: PatchOutcome::Patched { actions: 3 },
            }),
            "model: updated (3 edit(s))"
        );
        assert_eq!(
            describe_outcome(&ProcessOutcome::Applied {
                kind: FileKind::Hook,
                patch: PatchOutcome::Unchanged,
            }),
            "hook: up to date"
        );
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let root = Path::new("/work");
        assert_eq!(
            absolute(root, Path::new("/other/a.model.ts")),
            PathBuf::from("/other/a.model.ts")
        );
        assert!(absolute(root, Path::new("a.model.ts")).is_absolute());
    }
}
