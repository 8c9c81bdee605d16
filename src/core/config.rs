use crate::core::query::QueryOptions;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_DOLARAPI_URL: &str = "https://dolarapi.com";
pub const DEFAULT_ARGENTINADATOS_URL: &str = "https://api.argentinadatos.com";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DolarApiProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ArgentinaDatosProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default = "default_dolarapi")]
    pub dolarapi: DolarApiProviderConfig,
    #[serde(default = "default_argentinadatos")]
    pub argentinadatos: ArgentinaDatosProviderConfig,
}

fn default_dolarapi() -> DolarApiProviderConfig {
    DolarApiProviderConfig {
        base_url: DEFAULT_DOLARAPI_URL.to_string(),
    }
}

fn default_argentinadatos() -> ArgentinaDatosProviderConfig {
    ArgentinaDatosProviderConfig {
        base_url: DEFAULT_ARGENTINADATOS_URL.to_string(),
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            dolarapi: default_dolarapi(),
            argentinadatos: default_argentinadatos(),
        }
    }
}

/// Refresh policy for the quote snapshot.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PollingConfig {
    pub refetch_interval_ms: u64,
    pub stale_time_ms: u64,
    pub retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        PollingConfig {
            refetch_interval_ms: 60_000,
            stale_time_ms: 30_000,
            retries: 3,
            retry_delay_ms: 1_000,
        }
    }
}

impl PollingConfig {
    pub fn refetch_interval(&self) -> Duration {
        Duration::from_millis(self.refetch_interval_ms)
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            stale_time: Duration::from_millis(self.stale_time_ms),
            retries: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

/// Refresh policy for historical series.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub stale_time_ms: u64,
    pub retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            stale_time_ms: 300_000,
            retries: 2,
            retry_delay_ms: 1_000,
        }
    }
}

impl HistoryConfig {
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            stale_time: Duration::from_millis(self.stale_time_ms),
            retries: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("ar", "preciodolar", "preciodolar")
            .context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  dolarapi:
    base_url: "http://example.com/dolarapi"
polling:
  refetch_interval_ms: 120000
  retries: 5
data_path: "/tmp/preciodolar"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.providers.dolarapi.base_url,
            "http://example.com/dolarapi"
        );
        assert_eq!(
            config.providers.argentinadatos.base_url,
            DEFAULT_ARGENTINADATOS_URL
        );
        assert_eq!(config.polling.refetch_interval(), Duration::from_secs(120));
        assert_eq!(config.polling.retries, 5);
        // Unset fields keep their defaults
        assert_eq!(config.polling.stale_time_ms, 30_000);
        assert_eq!(config.history, HistoryConfig::default());
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/preciodolar")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());

        let options = config.polling.query_options();
        assert_eq!(options.stale_time, Duration::from_secs(30));
        assert_eq!(options.retries, 3);
        assert_eq!(config.polling.refetch_interval(), Duration::from_secs(60));

        let history = config.history.query_options();
        assert_eq!(history.stale_time, Duration::from_secs(300));
        assert_eq!(history.retries, 2);
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from_path(dir.path().join("missing.yaml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("Failed to read config file")
        );
    }
}
