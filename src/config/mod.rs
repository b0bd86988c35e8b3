//! Configuration module for the deals exporter

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.qogita.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 0;
pub const DEFAULT_OUTPUT_PATH: &str = "output.csv";
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Main application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub output: OutputSettings,
}

/// Remote API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    /// Connect and request timeout in seconds, 0 (the default) waits indefinitely
    pub timeout_secs: u64,
}

/// Export file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    pub path: PathBuf,
    /// Upper bound on search pages fetched in one run
    pub max_pages: u32,
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with EXPORT_, e.g. EXPORT_OUTPUT__PATH)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        Self::load_from(&config_dir, None)
    }

    /// Load from an explicit config directory.
    ///
    /// `env` replaces the process environment as the variable source when set.
    pub fn load_from(config_dir: &Path, env: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("output.path", DEFAULT_OUTPUT_PATH)?
            .set_default("output.max_pages", DEFAULT_MAX_PAGES as i64)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("EXPORT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            );

        builder.build()?.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api: ApiSettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            output: OutputSettings {
                path: PathBuf::from(DEFAULT_OUTPUT_PATH),
                max_pages: DEFAULT_MAX_PAGES,
            },
        }
    }
}
