//! Site-Harvest main entry point
//!
//! Runs one invocation from the command line and prints the JSON response.

use clap::Parser;
use site_harvest::config::{load_config_with_hash, Config};
use site_harvest::handler::{handle, Invocation};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Harvest: a bounded, polite, resumable single-domain crawler
///
/// Without `--batch`, crawls breadth-first from the start URL until the page
/// cap or time budget is reached. With `--batch N`, processes batch N of the
/// site's index page; pass the printed `nextBatch` back to continue.
#[derive(Parser, Debug)]
#[command(name = "site-harvest")]
#[command(version)]
#[command(about = "A bounded, polite, resumable single-domain crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Start URL (defaults to the configured start-url)
    #[arg(short, long)]
    url: Option<String>,

    /// Batch index; selects batch mode
    #[arg(short, long)]
    batch: Option<usize>,

    /// Request method to emulate (OPTIONS returns an empty response)
    #[arg(long, default_value = "GET")]
    method: String,

    /// Pretty-print the JSON response
    #[arg(long)]
    pretty: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let invocation = Invocation {
        method: cli.method,
        url: cli.url,
        batch: cli.batch,
    };

    let response = handle(invocation, &config).await;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", json);

    if !response.success {
        std::process::exit(1);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the JSON response.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_harvest=warn"),
            1 => EnvFilter::new("site_harvest=info,warn"),
            2 => EnvFilter::new("site_harvest=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
