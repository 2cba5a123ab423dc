use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

mod app;
mod cli;
mod config;
mod logging;
mod web;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client_config = config::build_client_config(&cli);
    let client = meghai_api::GeminiClient::new(client_config)?;

    if cli.web {
        let bind_addr: SocketAddr = format!("{}:{}", cli.web_bind, cli.web_port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", cli.web_bind, cli.web_port))?;
        return web::run_web_mode(&cli, client, bind_addr).await;
    }

    app::run_repl_mode(&cli, client).await
}
