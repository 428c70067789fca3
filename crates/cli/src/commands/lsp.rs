//! Language server command.

use anyhow::Result;

/// Run the language server over stdio.
pub async fn run() -> Result<()> {
    gql_assist_lsp::run_server().await;
    Ok(())
}
