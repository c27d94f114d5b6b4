mod commands;
mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

#[derive(Parser)]
#[command(name = "slo-graphite")]
#[command(about = "Compute threshold SLIs from a Graphite render API", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Count good and bad samples around the configured threshold
    Threshold {
        /// Path to SLO config file (YAML, TOML, or JSON)
        config_file: PathBuf,

        /// End of the window as a UNIX timestamp (defaults to now)
        #[arg(short, long)]
        timestamp: Option<i64>,

        /// Window length, e.g. "1h" or "30m"
        #[arg(short, long, default_value = "1h", value_parser = humantime::parse_duration)]
        window: Duration,

        /// Output format (cli, json)
        #[arg(short, long, default_value = "cli")]
        format: String,
    },

    /// Sum the positive values of the configured metric
    Count {
        /// Path to SLO config file (YAML, TOML, or JSON)
        config_file: PathBuf,

        /// End of the window as a UNIX timestamp (defaults to now)
        #[arg(short, long)]
        timestamp: Option<i64>,

        /// Window length, e.g. "1h" or "30m"
        #[arg(short, long, default_value = "1h", value_parser = humantime::parse_duration)]
        window: Duration,

        /// Output format (cli, json)
        #[arg(short, long, default_value = "cli")]
        format: String,
    },

    /// Validate an SLO config file
    Validate {
        /// Path to SLO config file
        config_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Threshold {
            config_file,
            timestamp,
            window,
            format,
        } => {
            commands::threshold::execute(config_file, timestamp, window, format).await?;
        }

        Commands::Count {
            config_file,
            timestamp,
            window,
            format,
        } => {
            commands::count::execute(config_file, timestamp, window, format).await?;
        }

        Commands::Validate { config_file } => {
            commands::validate::execute(config_file).await?;
        }
    }

    Ok(())
}
