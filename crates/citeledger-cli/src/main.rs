// crates/citeledger-cli/src/main.rs
//
// CLI entrypoint for the CiteLedger developer tools.
//
// Provides subcommands for generating author key pairs, signing request
// messages, and replaying scenario files through the citation service.

mod commands;
mod output;
mod scenario;

use clap::{Parser, Subcommand};
use commands::keygen::KeygenCmd;
use commands::replay::ReplayCmd;
use commands::sign::SignCmd;

use citeledger_service::ServiceConfig;

/// CiteLedger CLI: citation graph and token emission tooling.
#[derive(Parser, Debug)]
#[command(
    name = "citeledger",
    version = "0.1.0",
    about = "CiteLedger CLI: citation-weighted token emission for research papers"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.citeledger/config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a new ed25519 key pair.
    Keygen(KeygenCmd),

    /// Sign a message with a hex-encoded signing key.
    Sign(SignCmd),

    /// Replay a scenario file and print balances and statistics.
    Replay(ReplayCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The config decides the fallback log level, so load it before the
    // subscriber exists and report the outcome afterwards.
    let config_path = expand_tilde(&cli.config);
    let loaded = ServiceConfig::load(&config_path);
    let log_level = match &loaded {
        Ok(cfg) => cfg.log_level.clone(),
        Err(_) => ServiceConfig::default().log_level,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", config_path);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                config_path,
                e
            );
            ServiceConfig::default()
        }
    };

    match &cli.command {
        Commands::Keygen(cmd) => commands::keygen::run(cmd).await?,
        Commands::Sign(cmd) => commands::sign::run(cmd).await?,
        Commands::Replay(cmd) => commands::replay::run(cmd, &config).await?,
    }

    Ok(())
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).display().to_string();
        }
    }
    path.to_string()
}
