use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use logstream_client::config;
use logstream_client::view::{RenderOptions, TerminalView};
use logstream_client::LogStreamClient;
use simple_logger::SimpleLogger;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let mut cli = config::Cli::parse();

    SimpleLogger::new()
        .with_level(cli.log_level)
        .init()
        .context("Failed to initialise logger")?;

    info!("Starting logstream-client");

    // Load configuration
    let config = config::load_config(&cli)?;
    info!("Configuration loaded, endpoint {}", config.endpoint);

    let password = match cli.password.take() {
        Some(password) => password,
        None => prompt_password().await?,
    };

    let view = TerminalView::new(RenderOptions {
        color: config.color,
        timestamps: config.timestamps,
        json: config.json,
    });
    let mut client = LogStreamClient::new(config.endpoint.clone(), view);

    client
        .connect(&password)
        .with_context(|| format!("Failed to connect to {}", config.endpoint))?;
    drop(password);

    tokio::select! {
        _ = client.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, closing connection");
            client.disconnect();
            client.run().await;
        }
    }

    if client.auth_rejected() {
        anyhow::bail!("Server rejected the password");
    }

    Ok(())
}

async fn prompt_password() -> Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush().context("Failed to write prompt")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let line = lines
        .next_line()
        .await
        .context("Failed to read password")?
        .context("No password given on stdin")?;

    Ok(line.trim_end_matches('\r').to_string())
}
