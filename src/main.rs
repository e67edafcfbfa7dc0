//! tinyircd - Main binary

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tinyircd_core::Config;
use tracing::info;

/// tinyircd - A small single-process IRC server
#[derive(Parser)]
#[command(name = "tinyircd")]
#[command(about = "A small single-process IRC server")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Test configuration and exit
    #[arg(long)]
    test_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration file
    Config {
        /// Output file path
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
    /// Show version information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    if let Some(command) = cli.command {
        match command {
            Commands::Config { output } => generate_config(&output)?,
            Commands::Version => show_version(),
        }
        return Ok(());
    }

    let config = if cli.config.exists() {
        info!("Loading configuration from {:?}", cli.config);
        Config::from_file(&cli.config)?
    } else {
        info!("Configuration file not found, using defaults");
        Config::default()
    };

    config.validate()?;

    if cli.test_config {
        info!("Configuration is valid");
        return Ok(());
    }

    info!(
        "Starting {} as {} on {}",
        config.server.version,
        config.server.name,
        config.connection.bind_addr()
    );
    tinyircd_core::run(config).await?;
    info!("Server stopped");

    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();
}

/// Generate default configuration file
fn generate_config(output: &Path) -> anyhow::Result<()> {
    Config::default().to_file(output)?;
    println!("Generated default configuration file: {:?}", output);
    Ok(())
}

fn show_version() {
    println!("tinyircd {}", env!("CARGO_PKG_VERSION"));
}
