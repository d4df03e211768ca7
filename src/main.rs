//! UM API client - query the U-M API gateway from the command line
//!
//! Reads OAuth2 consumer credentials from the environment (or a `.env`
//! file), performs one request and prints the JSON response.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use umapi::cli::Cli;
use umapi::config::{ClientConfig, Credentials};
use umapi::{ApiClient, ResponseSource};

/// Sets up stderr logging, honouring `RUST_LOG` when it is set
fn init_tracing(verbose: bool) {
    let default = if verbose { "umapi=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = cli.command.to_request()?;
    let client = ApiClient::new(ClientConfig::default(), Credentials::from_env())?;

    let response = client.call(options).await?;
    if response.source == ResponseSource::Fallback {
        tracing::warn!("API unavailable, showing cached data");
    }

    println!("{}", serde_json::to_string_pretty(&response.data)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    // A missing .env file is fine; the variables may come from the shell.
    let _ = dotenvy::dotenv();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
