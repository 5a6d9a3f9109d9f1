//! # Application Configuration
//!
//! ## Configuration Sources (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults (this file)                                                │
//! │  2. tillbook.toml                                                       │
//! │     ~/.config/tillbook/tillbook.toml (Linux)                            │
//! │     ~/Library/Application Support/com.tillbook.tillbook/ (macOS)        │
//! │  3. Environment variables                                               │
//! │     TILLBOOK_DB_PATH, TILLBOOK_SHOP_NAME,                               │
//! │     TILLBOOK_LOW_STOCK_THRESHOLD, TILLBOOK_LOG                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```toml
//! shop_name = "Skate Shop Vila"
//! database_path = "/var/lib/tillbook/tillbook.db"
//! currency_symbol = "R$"
//! decimal_separator = ","
//! thousands_separator = "."
//! low_stock_threshold = 3
//! log_filter = "info,tillbook=debug,sqlx=warn"
//! ```
//!
//! Read-only after startup.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use tillbook_core::Money;

const CONFIG_FILE: &str = "tillbook.toml";
const DATABASE_FILE: &str = "tillbook.db";

/// Default log filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,tillbook=debug,sqlx=warn";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine a data directory for the database")]
    NoDataDir,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Displayed in the header and logs.
    pub shop_name: String,

    /// SQLite file. `None` resolves to the platform data directory.
    pub database_path: Option<PathBuf>,

    pub currency_symbol: String,

    pub decimal_separator: char,

    pub thousands_separator: char,

    /// One threshold for every product. `None` uses each product's
    /// own minimum stock.
    pub low_stock_threshold: Option<i64>,

    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    /// Brazilian real formatting, per-product low-stock thresholds.
    fn default() -> Self {
        AppConfig {
            shop_name: "Tillbook".to_string(),
            database_path: None,
            currency_symbol: "R$".to_string(),
            decimal_separator: ',',
            thousands_separator: '.',
            low_stock_threshold: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform config dir)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shop_name.trim().is_empty() {
            return Err(ConfigError::Invalid("shop_name must not be empty".into()));
        }

        if self.decimal_separator == self.thousands_separator {
            return Err(ConfigError::Invalid(
                "decimal_separator and thousands_separator must differ".into(),
            ));
        }

        if let Some(threshold) = self.low_stock_threshold {
            if threshold < 0 {
                return Err(ConfigError::Invalid(
                    "low_stock_threshold must not be negative".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies `TILLBOOK_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("TILLBOOK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup("TILLBOOK_SHOP_NAME") {
            self.shop_name = name;
        }

        if let Some(threshold) = lookup("TILLBOOK_LOW_STOCK_THRESHOLD") {
            match threshold.trim().parse::<i64>() {
                Ok(t) => self.low_stock_threshold = Some(t),
                Err(_) => warn!(value = %threshold, "Ignoring non-numeric low-stock threshold"),
            }
        }

        if let Some(filter) = lookup("TILLBOOK_LOG") {
            self.log_filter = filter;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "tillbook", "tillbook")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// The configured database file, or `tillbook.db` in the platform data dir.
    pub fn resolve_database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        ProjectDirs::from("com", "tillbook", "tillbook")
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
            .ok_or(ConfigError::NoDataDir)
    }

    /// Formats an amount for display, e.g. `R$ 1.234,56`.
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let whole = (cents / 100).unsigned_abs().to_string();
        let frac = (cents % 100).unsigned_abs();

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(digit);
        }

        format!(
            "{}{} {}{}{:02}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            grouped,
            self.decimal_separator,
            frac
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_format_currency() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(Money::from_cents(123456)), "R$ 1.234,56");
        assert_eq!(config.format_currency(Money::from_cents(100)), "R$ 1,00");
        assert_eq!(config.format_currency(Money::from_cents(1)), "R$ 0,01");
        assert_eq!(config.format_currency(Money::zero()), "R$ 0,00");
        assert_eq!(config.format_currency(Money::from_cents(-250000)), "-R$ 2.500,00");
        assert_eq!(
            config.format_currency(Money::from_cents(123456789)),
            "R$ 1.234.567,89"
        );
    }

    #[test]
    fn test_format_currency_custom_separators() {
        let config = AppConfig {
            currency_symbol: "$".to_string(),
            decimal_separator: '.',
            thousands_separator: ',',
            ..AppConfig::default()
        };
        assert_eq!(config.format_currency(Money::from_cents(123456)), "$ 1,234.56");
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("TILLBOOK_DB_PATH", "/tmp/shop.db"),
            ("TILLBOOK_SHOP_NAME", "Vila Skate"),
            ("TILLBOOK_LOW_STOCK_THRESHOLD", "3"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/shop.db")));
        assert_eq!(config.shop_name, "Vila Skate");
        assert_eq!(config.low_stock_threshold, Some(3));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_bad_threshold_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| {
            (key == "TILLBOOK_LOW_STOCK_THRESHOLD").then(|| "lots".to_string())
        });
        assert_eq!(config.low_stock_threshold, None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig =
            toml::from_str("shop_name = \"Vila Skate\"\nlow_stock_threshold = 2\n").unwrap();
        assert_eq!(config.shop_name, "Vila Skate");
        assert_eq!(config.low_stock_threshold, Some(2));
        assert_eq!(config.currency_symbol, "R$");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.thousands_separator = ',';
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = AppConfig {
            low_stock_threshold: Some(-1),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_database_path_wins() {
        let config = AppConfig {
            database_path: Some(PathBuf::from("shop.db")),
            ..AppConfig::default()
        };
        assert_eq!(config.resolve_database_path().unwrap(), PathBuf::from("shop.db"));
    }
}
