//! Pre-flight configuration checks for compute nodes.
//!
//! Usage:
//!   rcqt kernelcheck --config rcqt.toml  - Check OS and kernel allow-lists
//!   rcqt pcie --config rcqt.toml         - Report PCIe device properties
//!   rcqt run --config rcqt.toml          - Both of the above
//!
//! `-v` enables debug diagnostics, `-q` limits output to results and
//! warnings. `RUST_LOG` overrides both.

mod config;
mod pcie;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rcqt_core::TracingSink;
use rcqt_kernelcheck::HostSystem;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "rcqt")]
#[command(about = "Pre-flight configuration checks for compute nodes")]
struct Cli {
    /// Show debug diagnostics
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show results, warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the installed OS and running kernel against allow-lists
    Kernelcheck {
        /// Check file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Report PCIe capability properties of devices
    Pcie {
        /// Check file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Run every check in the check file
    Run {
        /// Check file
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn,rcqt::results=info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Runs the kernel check if configured; returns whether it passed.
fn kernelcheck(config: &Config) -> Result<bool> {
    let Some(props) = &config.kernelcheck else {
        tracing::info!("no [kernelcheck] table, skipping");
        return Ok(true);
    };
    let outcome = rcqt_kernelcheck::run(props, &HostSystem::default(), &TracingSink)?;
    Ok(outcome.is_none_or(|o| o.passed()))
}

fn pcie(config: &Config) -> Result<()> {
    match &config.pcie {
        Some(pcie) => pcie::run(pcie, &TracingSink),
        None => {
            tracing::info!("no [pcie] table, skipping");
            Ok(())
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let passed = match cli.command {
        Commands::Kernelcheck { config } => kernelcheck(&Config::load(&config)?)?,
        Commands::Pcie { config } => {
            pcie(&Config::load(&config)?)?;
            true
        }
        Commands::Run { config } => {
            let config = Config::load(&config)?;
            let passed = kernelcheck(&config)?;
            pcie(&config)?;
            passed
        }
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
