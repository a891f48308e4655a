//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.govdash.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".govdash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Source table settings.
    #[serde(default)]
    pub data: DataConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path for one-shot reports.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "analytics_report.json".to_string()
}

/// Where the five source tables live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the CSV files.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_governance")]
    pub governance: String,

    #[serde(default = "default_surge")]
    pub surge: String,

    #[serde(default = "default_anomaly")]
    pub anomaly: String,

    #[serde(default = "default_quality_drift")]
    pub quality_drift: String,

    #[serde(default = "default_load")]
    pub load: String,

    /// Upper bound on each file read, in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_seconds: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            governance: default_governance(),
            surge: default_surge(),
            anomaly: default_anomaly(),
            quality_drift: default_quality_drift(),
            load: default_load(),
            read_timeout_seconds: default_read_timeout(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_governance() -> String {
    "governance_dashboard.csv".to_string()
}

fn default_surge() -> String {
    "demand_surge_analysis.csv".to_string()
}

fn default_anomaly() -> String {
    "district_anomaly_analysis.csv".to_string()
}

fn default_quality_drift() -> String {
    "quality_drift_index.csv".to_string()
}

fn default_load() -> String {
    "district_load_index.csv".to_string()
}

fn default_read_timeout() -> u64 {
    10
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.govdash.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.data_dir {
            self.data.dir = dir.clone();
        }

        if let Some(timeout) = args.timeout {
            self.data.read_timeout_seconds = timeout;
        }

        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.dir, PathBuf::from("data"));
        assert_eq!(config.data.governance, "governance_dashboard.csv");
        assert_eq!(config.data.read_timeout_seconds, 10);
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.general.output, "analytics_report.json");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "out/report.md"
verbose = true

[data]
dir = "/srv/analytics"
load = "dli.csv"
read_timeout_seconds = 3

[server]
bind = "0.0.0.0:8080"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "out/report.md");
        assert!(config.general.verbose);
        assert_eq!(config.data.dir, PathBuf::from("/srv/analytics"));
        assert_eq!(config.data.load, "dli.csv");
        assert_eq!(config.data.surge, "demand_surge_analysis.csv");
        assert_eq!(config.data.read_timeout_seconds, 3);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[server]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data.anomaly, "district_anomaly_analysis.csv");
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE), "[server]\nbind = \"127.0.0.1:9000\"\n")
            .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[data\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }
}
