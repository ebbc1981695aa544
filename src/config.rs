/// Configuration management using figment
///
/// Loads configuration with this precedence (highest wins):
/// 1. Defaults (hardcoded)
/// 2. TOML file: shoprec.toml (in working directory)
/// 3. Environment variables: prefixed SHOPREC_ (e.g., SHOPREC_LOG_LEVEL=debug,
///    SHOPREC_SIMULATOR__ENABLED=true for nested sections)

use figment::{
    Figment,
    providers::{Env, Format, Toml, Serialized},
};
use serde::{Deserialize, Serialize};
use crate::errors::ShoprecError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Stderr format: auto, pretty, json
    #[serde(default)]
    pub log_format: LogFormat,

    /// Optional file path for JSON log output (in addition to stderr)
    #[serde(default)]
    pub log_file: Option<String>,

    /// Path to a JSON array of products. The built-in catalog is used when unset.
    #[serde(default)]
    pub catalog_path: Option<String>,

    /// Result count used when a caller does not pass `limit`
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    #[serde(default)]
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Auto,
    Pretty,
    Json,
}

/// Price and stock drift applied to the catalog in the background.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between drift ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Per-tick chance that a product's price moves
    #[serde(default = "default_price_change_probability")]
    pub price_change_probability: f64,

    /// Per-tick chance that a product's stock flag is re-rolled
    #[serde(default = "default_stock_change_probability")]
    pub stock_change_probability: f64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_limit() -> u32 {
    12
}

fn default_interval_secs() -> u64 {
    30
}

fn default_price_change_probability() -> f64 {
    0.1
}

fn default_stock_change_probability() -> f64 {
    0.02
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            enabled: false,
            interval_secs: default_interval_secs(),
            price_change_probability: default_price_change_probability(),
            stock_change_probability: default_stock_change_probability(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_log_level(),
            log_format: LogFormat::Auto,
            log_file: None,
            catalog_path: None,
            default_limit: default_limit(),
            simulator: SimulatorConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, TOML file, and environment variables
    ///
    /// Environment variables override TOML file values.
    /// Example: SHOPREC_LOG_LEVEL=debug overrides log_level in shoprec.toml
    pub fn load() -> Result<Config, ShoprecError> {
        Self::figment()
            .extract()
            .map_err(|e| ShoprecError::Config(format!("Failed to load config: {}", e)))
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("shoprec.toml"))
            .merge(Env::prefixed("SHOPREC_").split("__"))
    }
}
