use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::sweep::MAX_THRESHOLD_DAYS;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub sweep: SweepConfig,

    pub scheduler: SchedulerConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/jobsweep.db".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    /// `*` allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 6790,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

/// How orphaned search terms are detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanStrategy {
    /// One grouped link count over all candidates.
    #[default]
    Batched,

    /// One link count per candidate.
    PerCandidate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Terms not searched for this many days have their popularity reset.
    pub stale_after_days: u32,

    /// Terms not searched for this many days are deleted once nothing links to them.
    pub orphan_after_days: u32,

    pub orphan_strategy: OrphanStrategy,

    /// Sweep the pre-normalization `job_cache` table.
    /// Disable once every deployment has dropped it.
    pub legacy_cache_enabled: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            stale_after_days: 30,
            orphan_after_days: 60,
            orphan_strategy: OrphanStrategy::Batched,
            legacy_cache_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,

    /// Six-field cron expression (seconds first).
    pub cron_expression: Option<String>,

    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cron_expression: Some("0 0 3 * * *".to_string()),
            run_on_startup: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "jobsweep".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies `.env` and
    /// `JOBSWEEP_*` environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var("JOBSWEEP_DATABASE_URL") {
            self.general.database_url = url;
        }

        if let Some(level) = var("JOBSWEEP_LOG_LEVEL") {
            self.general.log_level = level;
        }

        if let Some(port) = var("JOBSWEEP_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid JOBSWEEP_PORT: {port}"))?;
        }

        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("jobsweep").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".jobsweep").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.sweep.stale_after_days == 0 || self.sweep.orphan_after_days == 0 {
            anyhow::bail!("Sweep thresholds must be at least one day");
        }

        if self.sweep.orphan_after_days > MAX_THRESHOLD_DAYS {
            anyhow::bail!(
                "orphan_after_days ({}) exceeds the maximum of {MAX_THRESHOLD_DAYS} days",
                self.sweep.orphan_after_days
            );
        }

        if self.sweep.orphan_after_days < self.sweep.stale_after_days {
            anyhow::bail!(
                "orphan_after_days ({}) must not be shorter than stale_after_days ({})",
                self.sweep.orphan_after_days,
                self.sweep.stale_after_days
            );
        }

        if self.scheduler.enabled && self.scheduler.cron_expression.is_none() {
            anyhow::bail!("Scheduler is enabled but no cron expression is set");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sweep.stale_after_days, 30);
        assert_eq!(config.sweep.orphan_after_days, 60);
        assert_eq!(config.sweep.orphan_strategy, OrphanStrategy::Batched);
        assert!(config.sweep.legacy_cache_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[sweep]"));
        assert!(toml_str.contains("orphan_strategy = \"batched\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [sweep]
            orphan_strategy = "per_candidate"
            legacy_cache_enabled = false
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.sweep.orphan_strategy, OrphanStrategy::PerCandidate);
        assert!(!config.sweep.legacy_cache_enabled);

        assert_eq!(config.sweep.stale_after_days, 30);
        assert_eq!(config.server.port, 6790);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(|key| match key {
                "JOBSWEEP_DATABASE_URL" => Some("sqlite::memory:".to_string()),
                "JOBSWEEP_PORT" => Some("8080".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.general.database_url, "sqlite::memory:");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_invalid_port_override_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|key| {
            (key == "JOBSWEEP_PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = Config::default();
        config.sweep.stale_after_days = 90;
        assert!(config.validate().is_err());

        config.sweep.stale_after_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_thresholds() {
        let mut config = Config::default();
        config.sweep.orphan_after_days = MAX_THRESHOLD_DAYS;
        assert!(config.validate().is_ok());

        config.sweep.orphan_after_days = MAX_THRESHOLD_DAYS + 1;
        assert!(config.validate().is_err());

        config.sweep.stale_after_days = u32::MAX;
        config.sweep.orphan_after_days = u32::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_cron_when_scheduled() {
        let mut config = Config::default();
        config.scheduler.enabled = true;
        config.scheduler.cron_expression = None;
        assert!(config.validate().is_err());
    }
}
