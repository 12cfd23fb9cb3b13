use clap::{Parser, Subcommand};

pub mod config;
pub mod version;

#[derive(Parser)]
#[command(name = "asset-governance")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operator CLI for ledger asset governance", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the governance configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a commented default configuration
    Init {
        /// Config file path (default: <config dir>/asset-governance/config.toml)
        #[arg(long)]
        path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Load and validate a configuration, then print the effective rules
    Check {
        /// Config file path (default: <config dir>/asset-governance/config.toml)
        #[arg(long)]
        path: Option<String>,
    },
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => config::init(path, force),
            ConfigAction::Check { path } => config::check(path),
        },
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
