//! Simulator configuration
//!
//! Handles:
//! - Monitoring endpoint URL
//! - Cycle interval and HTTP request timeout
//! - Optional TOML file + environment override
//!
//! Every field has a default, so running without any file gives the stock
//! behaviour: post to the public mock API every 30 seconds.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "https://pragmateches-cmms-mock-two.vercel.app/api/process/monitor";
pub const DEFAULT_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Env var pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "PROCESS_SIMULATOR_CONFIG";
/// Env var overriding `api_url`
pub const API_URL_ENV: &str = "PROCESS_SIMULATOR_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub api_url: String,
    pub interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl SimulatorConfig {
    /// Resolve the config file, apply env overrides and validate
    pub async fn load() -> Result<Self> {
        let mut config = match Self::config_file_path() {
            Some(path) => Self::load_from(&path).await?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            debug!("API URL overridden by {}", API_URL_ENV);
            self.api_url = url.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api_url)
            .with_context(|| format!("Invalid api_url: {:?}", self.api_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("api_url must be http or https, got {}", url.scheme());
        }
        if self.interval_secs == 0 {
            anyhow::bail!("interval_secs must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Explicit path from env, then `./simulator.toml`, then the OS config dir
    pub fn config_file_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        let local = PathBuf::from("simulator.toml");
        if local.exists() {
            return Some(local);
        }

        let mut path = dirs::config_dir()?;
        path.push("process-simulator");
        path.push("config.toml");
        path.exists().then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SimulatorConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.interval(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulatorConfig::from_toml("interval_secs = 5\n").unwrap();
        assert_eq!(config.interval_secs, 5);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

        assert_eq!(SimulatorConfig::from_toml("  \n").unwrap(), SimulatorConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(SimulatorConfig::from_toml("interval_secs = \"soon\"").is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = SimulatorConfig::default();
        config.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = SimulatorConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = SimulatorConfig::default();
        config.api_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api_url = "ftp://example.com/monitor".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_override() {
        let env: HashMap<&str, &str> = [(API_URL_ENV, " http://localhost:3000/api/process/monitor ")].into();

        let mut config = SimulatorConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api_url, "http://localhost:3000/api/process/monitor");

        let mut config = SimulatorConfig::default();
        config.apply_overrides(|_| Some(String::new()));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = \"http://127.0.0.1:8080/monitor\"").unwrap();
        writeln!(file, "request_timeout_secs = 3").unwrap();

        let config = SimulatorConfig::load_from(file.path()).await.unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:8080/monitor");
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.interval_secs, DEFAULT_INTERVAL_SECS);
    }

    #[tokio::test]
    async fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SimulatorConfig::load_from(&dir.path().join("absent.toml")).await;
        assert!(result.is_err());
    }
}
