#![deny(clippy::print_stdout, clippy::print_stderr)]

#[tokio::main]
async fn main() -> std::io::Result<()> {
    checkmk_mcp_server::run_main().await
}
