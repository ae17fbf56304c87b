//! Tracker configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `CT_TRACKER__SECTION__KEY` environment overrides.

use analytics::{AnalyticsConfig, ConfluenceConfig};
use anyhow::{Context, Result};
use common::{LedgerState, PortfolioSettings, DEFAULT_PORTFOLIO_VALUE, DEFAULT_RISK_PER_TRADE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "CT_TRACKER";

/// Top-level tracker configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Settings for a ledger that has never been saved
    #[serde(default)]
    pub portfolio: PortfolioConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub confluence: ConfluenceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON document holding the whole ledger
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("ct-tracker-data.json")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    /// Portfolio value in USD
    #[serde(default = "default_portfolio_value")]
    pub portfolio_value: f64,

    /// Percent of the portfolio risked per trade
    #[serde(default = "default_risk_per_trade")]
    pub risk_per_trade: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            portfolio_value: default_portfolio_value(),
            risk_per_trade: default_risk_per_trade(),
        }
    }
}

impl PortfolioConfig {
    pub fn settings(&self) -> PortfolioSettings {
        PortfolioSettings::new(self.portfolio_value, self.risk_per_trade)
    }
}

fn default_portfolio_value() -> f64 {
    DEFAULT_PORTFOLIO_VALUE
}

fn default_risk_per_trade() -> f64 {
    DEFAULT_RISK_PER_TRADE
}

impl TrackerConfig {
    /// The state a brand new ledger starts from
    pub fn fresh_state(&self) -> LedgerState {
        LedgerState::with_settings(self.portfolio.settings())
    }

    fn validate(&self) -> Result<()> {
        self.portfolio
            .settings()
            .validate()
            .context("Invalid [portfolio] section")?;
        anyhow::ensure!(
            self.confluence.min_sources >= 1,
            "confluence.min_sources must be at least 1"
        );
        Ok(())
    }
}

/// Load configuration. A missing file is not an error.
pub fn load_config(path: &Path) -> Result<TrackerConfig> {
    let defaults = ::config::Config::try_from(&TrackerConfig::default())
        .context("Failed to serialise default configuration")?;

    let settings = ::config::Config::builder()
        .add_source(defaults)
        .add_source(
            ::config::File::from(path)
                .format(::config::FileFormat::Toml)
                .required(false),
        )
        .add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("confluence.tiers"),
        )
        .build()
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    let config: TrackerConfig = settings
        .try_deserialize()
        .context("Failed to parse configuration")?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to a TOML file
pub fn save_config(config: &TrackerConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Tier;

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();
        assert_eq!(config.storage.data_file, PathBuf::from("ct-tracker-data.json"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.portfolio.settings(), PortfolioSettings::default());
        assert_eq!(config.analytics.top_performer_min_calls, 3);
        assert_eq!(config.confluence.tiers, vec![Tier::S, Tier::A]);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn test_partial_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ct-tracker.toml");
        std::fs::write(
            &path,
            concat!(
                "[portfolio]\nportfolio_value = 50000.0\n\n",
                "[confluence]\nmin_sources = 3\ntiers = [\"S\"]\n",
            ),
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.portfolio.portfolio_value, 50_000.0);
        assert_eq!(config.portfolio.risk_per_trade, 2.0);
        assert_eq!(config.confluence.min_sources, 3);
        assert_eq!(config.confluence.tiers, vec![Tier::S]);
        assert!(config.confluence.dedupe_by_source);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ct-tracker.toml");

        let mut config = TrackerConfig::default();
        config.analytics.top_assets_limit = 8;
        config.storage.data_file = PathBuf::from("/tmp/ledger.json");
        save_config(&config, &path).unwrap();

        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_portfolio_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ct-tracker.toml");
        std::fs::write(&path, "[portfolio]\nrisk_per_trade = 250.0\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
