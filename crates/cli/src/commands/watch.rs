//! Watch command: keep generated files in step while editing.

use super::WorkspaceContext;
use crate::watch::FileWatcher;
use crate::output::OutputOptions;
use anyhow::Result;

pub async fn run(ctx: WorkspaceContext, output: OutputOptions) -> Result<()> {
    let mut watcher = FileWatcher::new(ctx, output)?;
    watcher.start()?;
    watcher.run().await
}
