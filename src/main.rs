use anyhow::Result;
use clap::Parser;
use primo_booklist::config::load_config;
use primo_booklist::pipeline::BatchRunner;
use primo_booklist::table::{load_requests, parse_id_list};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status when one or more requests produced no output
const EXIT_REQUEST_FAILED: u8 = 1;

/// Exit status for configuration, request table and other fatal errors
const EXIT_FATAL: u8 = 2;

/// Primo Booklist - Generate embeddable HTML book lists from Primo searches
#[derive(Parser, Debug)]
#[command(name = "primo-booklist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate embeddable HTML book lists from Primo searches", long_about = None)]
struct Cli {
    /// Comma-separated request ids to generate (e.g. 1,3); all requests when omitted
    ids: Option<String>,

    /// Configuration file path
    #[arg(long, default_value = "config.yml")]
    config: PathBuf,

    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("primo_booklist={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_REQUEST_FAILED),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Returns whether every selected request was written
async fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli.config)?;
    tracing::debug!("Using config file: {}", cli.config.display());

    let ids = cli.ids.as_deref().map(parse_id_list);
    let requests = load_requests(&config.requests_file_path, ids.as_deref())?;

    if requests.is_empty() {
        tracing::warn!("No matching requests in {}", config.requests_file_path.display());
    }

    let runner = BatchRunner::from_config(&config)?;
    let summary = runner.run(&requests).await?;

    for failed in &summary.failed {
        tracing::error!("Not generated: {} ({})", failed.file_name, failed.error);
    }

    Ok(summary.is_success())
}
