//! Configuration loading and layering
//!
//! Precedence, lowest first: built-in defaults, TOML file (`--config`),
//! environment (`IP`, `SCAN_MODE`, `SKIP_DUPLICATES`, `LOG_DIR`), command
//! line flags.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use ug405_decoder::{ResolverConfig, ScanMode};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Controller IPv4 address (required)
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub scan_mode: ScanMode,
    #[serde(default)]
    pub skip_duplicates: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Delay between cycles; 0 polls continuously
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
    /// Upper bound for the failure backoff; unset keeps a fixed cadence
    #[serde(default)]
    pub backoff_max_ms: Option<u64>,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs_snmp")
}

fn default_interval() -> u64 {
    200
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            host: None,
            scan_mode: ScanMode::default(),
            skip_duplicates: false,
            log_dir: default_log_dir(),
            interval_ms: default_interval(),
            backoff_max_ms: None,
            resolver: ResolverConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Overlay values from the environment
    ///
    /// `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ip) = lookup("IP") {
            self.host = Some(ip);
        }

        if let Some(mode) = lookup("SCAN_MODE") {
            // Anything other than "light" selects full mode
            self.scan_mode = match mode.to_lowercase().as_str() {
                "light" => ScanMode::Light,
                "full" => ScanMode::Full,
                other => {
                    log::warn!("Unknown SCAN_MODE '{}', using full mode", other);
                    ScanMode::Full
                }
            };
        }

        if let Some(skip) = lookup("SKIP_DUPLICATES") {
            // Inverted: SKIP_DUPLICATES=false enables suppression
            self.skip_duplicates = skip.to_lowercase() == "false";
            log::debug!("SKIP_DUPLICATES={} -> suppression {}", skip, self.skip_duplicates);
        }

        if let Some(dir) = lookup("LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
    }

    /// The target host, or an error if none was configured
    pub fn require_host(&self) -> Result<&str> {
        match self.host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => Ok(host),
            _ => bail!("No target host configured (use --host, the IP environment variable or `host` in the config file)"),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<MonitorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: MonitorConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
