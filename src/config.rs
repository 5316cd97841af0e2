use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Search engine configuration
    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with built-in defaults
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: CATALOG)
            .add_source(
                config::Environment::with_prefix("CATALOG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Write visibility contract for index writes
///
/// `WaitFor` makes every write (and delete) visible to searches before the
/// call returns; `Async` lets readers catch up on their own schedule. This is
/// a deployment-time setting, not negotiated per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    WaitFor,
    Async,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Root directory holding one index per collection
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Write visibility mode applied to every index/delete call
    #[serde(default = "default_refresh")]
    pub refresh: RefreshMode,

    /// Index writer heap size in bytes
    #[serde(default = "default_writer_heap_bytes")]
    pub writer_heap_bytes: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            refresh: default_refresh(),
            writer_heap_bytes: default_writer_heap_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/index")
}

fn default_refresh() -> RefreshMode {
    RefreshMode::WaitFor
}

fn default_writer_heap_bytes() -> usize {
    50_000_000
}
