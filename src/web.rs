#![cfg(not(tarpaulin_include))]

use inventory_dashboard::{app, config, loader, sample};
use log::info;
use std::env;
use std::path::PathBuf;

/// Main entry point for the web dashboard
///
/// # Arguments
/// * optional path to a TOML config file; the embedded defaults are used otherwise
///
/// The inventory is seeded from `server.inventory_path` when configured, and
/// from the bundled sample data otherwise.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = config::load_config(config_path.as_deref())?;

    let inventory = match &config.server.inventory_path {
        Some(path) => loader::load_inventory_file(path)?,
        None => sample::sample_inventory(),
    };
    info!("Seeded dashboard with {} inventory records", inventory.len());

    app::run(config, inventory).await
}
