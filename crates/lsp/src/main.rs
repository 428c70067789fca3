#[tokio::main]
async fn main() {
    gql_assist_lsp::run_server().await;
}
