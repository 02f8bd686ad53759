use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::HeirRelationship;

pub mod commands;

#[derive(Parser)]
#[command(name = "plot-contract")]
#[command(about = "Digitize cemetery plot contracts and check inheritance eligibility")]
#[command(long_about = "Uploads a scanned plot contract to the extraction service, shows the extracted \
                       fields, then asks the inheritance service which documents a given heir needs. \
                       Start with 'plot-contract check <FILE>' or open an interactive 'plot-contract session'.")]
pub struct Cli {
    /// Override the service base URL (default from configuration)
    #[arg(long, global = true, help = "Base URL of the extraction / inheritance service")]
    pub base_url: Option<String>,
    /// Emit JSON log lines on stderr
    #[arg(long, global = true, help = "Write structured JSON logs to stderr")]
    pub json_logs: bool,
    /// Verbose logging
    #[arg(long, short = 'v', global = true, help = "Log request details at debug level")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a contract scan and print the extracted fields
    Extract {
        /// Contract image or PDF
        file: PathBuf,
    },
    /// Extract a contract, then run the inheritance eligibility check
    Check {
        /// Contract image or PDF
        file: PathBuf,
        /// Relationship of the heir to the contract holder
        #[arg(long, short = 'r', default_value = "spouse", help = "spouse, child or third_party")]
        relationship: HeirRelationship,
    },
    /// Interactive session driving the full workflow
    Session {
        /// Optional contract to upload when the session starts
        file: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Also write it to this file, e.g. plot-contract.toml
        #[arg(long, help = "Write the effective configuration to a TOML file")]
        write: Option<PathBuf>,
    },
}
