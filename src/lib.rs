pub mod analyzer;
pub mod cli;
pub mod core;
pub mod fetch;
pub mod normalize;
pub mod providers;
pub mod quality;
pub mod scoring;
pub mod signals;
pub mod store;

pub use analyzer::Analyzer;

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Scores {
        weights: HashMap<String, f64>,
        refresh: bool,
    },
    Summary {
        weights: HashMap<String, f64>,
    },
    Quality,
    CacheInfo,
    CacheClear,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Sector analyzer starting...");

    let config = match config_path {
        Some(path) => core::config::AppConfig::load_from_path(path)?,
        None => core::config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let cache = Arc::new(store::DiskStore::new(config.cache_path()?)?);
    let analyzer = Analyzer::new(&config, cache);

    match command {
        AppCommand::Scores { weights, refresh } => {
            cli::scores::run(&analyzer, &weights, refresh).await
        }
        AppCommand::Summary { weights } => cli::summary::run(&analyzer, &weights).await,
        AppCommand::Quality => cli::quality::run(&analyzer).await,
        AppCommand::CacheInfo => cli::cache::info(&analyzer).await,
        AppCommand::CacheClear => cli::cache::clear(&analyzer).await,
    }
}
