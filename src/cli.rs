use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

#[derive(Parser)]
#[command(name = "marketpanel")]
#[command(about = "Cross-market daily panel cleaning and alignment", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean, currency-convert and align the configured datasets
    Clean {
        /// Path to a JSON pipeline config (defaults to the built-in config)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for cleaned CSVs
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
    /// Build the merged feature dataset from cleaned CSVs
    Features {
        /// Primary dataset the panel is keyed on
        #[arg(short, long, default_value = "nifty_etf")]
        primary: String,

        /// Directory holding the cleaned CSVs
        #[arg(long)]
        processed_dir: Option<PathBuf>,

        /// Output file for the feature dataset
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Show current status of the cleaned datasets
    Status {
        /// Directory holding the cleaned CSVs
        #[arg(long)]
        processed_dir: Option<PathBuf>,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Clean { config, out_dir } => {
            commands::clean::run(config, out_dir);
        }
        Commands::Features {
            primary,
            processed_dir,
            out,
        } => {
            commands::features::run(primary, processed_dir, out);
        }
        Commands::Status { processed_dir } => {
            commands::status::run(processed_dir);
        }
    }
}
