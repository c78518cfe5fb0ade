use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use sectorscope::core::log::init_logging;
use std::collections::HashMap;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Indicator weights; any subset may be given and the rest default. Values
/// are renormalized to sum to 1.
#[derive(Args, Clone, Default)]
struct WeightArgs {
    #[arg(long)]
    momentum: Option<f64>,
    #[arg(long)]
    valuation: Option<f64>,
    #[arg(long)]
    growth: Option<f64>,
    #[arg(long)]
    innovation: Option<f64>,
    #[arg(long = "macro")]
    macro_weight: Option<f64>,
}

impl WeightArgs {
    fn into_map(self) -> HashMap<String, f64> {
        let mut weights = HashMap::new();
        let mut insert = |key: &str, value: Option<f64>| {
            if let Some(value) = value {
                weights.insert(key.to_string(), value);
            }
        };
        insert("momentum", self.momentum);
        insert("valuation", self.valuation);
        insert("growth", self.growth);
        insert("innovation", self.innovation);
        insert("macro", self.macro_weight);
        weights
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Rank all sectors by opportunity score
    Scores {
        #[command(flatten)]
        weights: WeightArgs,
        /// Bypass the cache and re-hit every data source
        #[arg(long)]
        refresh: bool,
    },
    /// Display top/bottom sectors and score drivers
    Summary {
        #[command(flatten)]
        weights: WeightArgs,
    },
    /// Check the health of every data source
    Quality,
    /// Inspect or clear the data cache
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show cache entry counts and size
    Info,
    /// Remove all cached entries
    Clear,
}

impl From<Commands> for sectorscope::AppCommand {
    fn from(cmd: Commands) -> sectorscope::AppCommand {
        match cmd {
            Commands::Scores { weights, refresh } => sectorscope::AppCommand::Scores {
                weights: weights.into_map(),
                refresh,
            },
            Commands::Summary { weights } => sectorscope::AppCommand::Summary {
                weights: weights.into_map(),
            },
            Commands::Quality => sectorscope::AppCommand::Quality,
            Commands::Cache { action } => match action {
                CacheCommands::Info => sectorscope::AppCommand::CacheInfo,
                CacheCommands::Clear => sectorscope::AppCommand::CacheClear,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => sectorscope::cli::setup::setup(),
        Some(command) => sectorscope::run_command(command.into(), cli.config_path.as_deref()).await,
        None => {
            // No subcommand: print help rather than hitting the network.
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    result
}
