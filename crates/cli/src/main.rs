//! GKE Capacity Advisor CLI
//!
//! Reads a cluster snapshot (live or from a file), classifies every node
//! pool, flags pods at memory risk and prints the results.

mod commands;
mod output;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{analyze, snapshot, show_config, SourceArgs};

/// GKE Capacity Advisor CLI
#[derive(Parser)]
#[command(name = "gke-advisor")]
#[command(author, version, about = "Capacity advisor for GKE node pools", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "GKE_ADVISOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to kubeconfig file (uses default if not specified)
    #[arg(long, global = true, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze node pools, nodes and pods
    Analyze {
        /// Read a snapshot file instead of the live cluster
        #[arg(long, short)]
        snapshot: Option<PathBuf>,

        /// Number of risky pods to list
        #[arg(long)]
        top: Option<usize>,

        /// Write Prometheus text exposition to this file
        #[arg(long)]
        metrics_out: Option<PathBuf>,
    },

    /// Capture a live snapshot to a JSON file
    Snapshot {
        /// Output file path
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let mut config = settings::load(cli.config.as_deref())?;
    let source = SourceArgs {
        kubeconfig: cli.kubeconfig,
        context: cli.context,
    };

    match cli.command {
        Commands::Analyze {
            snapshot,
            top,
            metrics_out,
        } => {
            if let Some(top) = top {
                config.report.top_pods = top;
                config.validate()?;
            }
            analyze::run(config, &source, snapshot, metrics_out, cli.format).await?;
        }
        Commands::Snapshot { output } => {
            snapshot::run(&config, &source, &output, cli.format).await?;
        }
        Commands::Config => {
            show_config::run(&config, cli.format)?;
        }
    }

    Ok(())
}
