//! Chart configuration: the ticker set, the range selector and provider settings.
//!
//! The five compared tickers are compiled in as defaults. A TOML file can
//! override any section; missing sections fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Default Yahoo Finance chart endpoint host.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Provider interval token. One point per month, never configurable.
pub const MONTHLY_INTERVAL: &str = "1mo";

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Time window requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChartRange {
    #[serde(rename = "1y")]
    OneYear,
    #[default]
    #[serde(rename = "5y")]
    FiveYears,
}

impl ChartRange {
    /// Range token sent to the provider.
    pub fn token(self) -> &'static str {
        match self {
            ChartRange::OneYear => "1y",
            ChartRange::FiveYears => "5y",
        }
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ChartRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1y" => Ok(ChartRange::OneYear),
            "5y" => Ok(ChartRange::FiveYears),
            other => Err(ConfigError::Invalid(format!(
                "unknown range '{other}' (expected 1y or 5y)"
            ))),
        }
    }
}

/// A compared ticker and the name the chart legend shows for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerConfig {
    pub symbol: String,
    pub display_name: String,
}

impl TickerConfig {
    pub fn new(symbol: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
        }
    }
}

/// HTTP settings for the chart provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
        }
    }
}

/// The complete chart configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub default_range: ChartRange,
    pub provider: ProviderConfig,
    pub tickers: Vec<TickerConfig>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            default_range: ChartRange::default(),
            provider: ProviderConfig::default(),
            tickers: default_tickers(),
        }
    }
}

/// The five compiled-in tickers.
pub fn default_tickers() -> Vec<TickerConfig> {
    vec![
        TickerConfig::new("^GSPC", "S&P 500"),
        TickerConfig::new("^IXIC", "Nasdaq Composite"),
        TickerConfig::new("VTSAX", "Vanguard Total Stock Market"),
        TickerConfig::new("GLD", "Gold"),
        TickerConfig::new("BTC-USD", "Bitcoin"),
    ]
}

impl ChartConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ChartConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::Invalid("at least one ticker is required".into()));
        }
        let mut seen = HashSet::new();
        for ticker in &self.tickers {
            let symbol = ticker.symbol.trim();
            if symbol.is_empty() {
                return Err(ConfigError::Invalid("ticker symbol must not be empty".into()));
            }
            if !seen.insert(symbol) {
                return Err(ConfigError::Invalid(format!("duplicate ticker symbol '{symbol}'")));
            }
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.tickers.iter().map(|t| t.symbol.as_str()).collect()
    }

    /// Display name for a symbol, falling back to the symbol itself.
    pub fn display_name<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.tickers
            .iter()
            .find(|t| t.symbol == symbol)
            .map(|t| t.display_name.as_str())
            .unwrap_or(symbol)
    }
}
