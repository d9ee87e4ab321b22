use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::reconcile::UnmatchedPolicy;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Highest quantity still reported as "running out".
    pub low_stock_threshold: u64,
    /// Bars in the top items chart.
    pub top_items: usize,
    /// Country cards shown above the charts.
    pub country_cards: usize,
    pub unmatched_policy: UnmatchedPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            low_stock_threshold: crate::views::LOW_STOCK_THRESHOLD,
            top_items: 10,
            country_cards: 3,
            unmatched_policy: UnmatchedPolicy::Ignore,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Inventory file to seed from; the bundled sample data is used when unset.
    pub inventory_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:3000".to_string(),
            inventory_path: None,
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[dashboard]
low_stock_threshold = 10
top_items = 10
country_cards = 3
unmatched_policy = "ignore"

[server]
bind = "127.0.0.1:3000"
"#;

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Load configuration from a TOML file, or the embedded default when no
/// path is given.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => {
            info!("Loading config from: {}", path.display());
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Config::from_toml(&contents)
        }
        None => {
            info!("Using default embedded configuration");
            Config::from_toml(DEFAULT_CONFIG)
        }
    }
}
