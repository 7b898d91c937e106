//! Chart provider trait and structured error types.
//!
//! The ChartProvider trait abstracts over the chart-data source so the Yahoo
//! client can be swapped for an in-memory provider in tests.

use crate::cancel::CancelToken;
use crate::config::ChartRange;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw monthly price point from a provider (before filtering/normalization).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPricePoint {
    /// Epoch seconds.
    pub timestamp: i64,
    pub close: Option<f64>,
}

impl RawPricePoint {
    pub fn new(timestamp: i64, close: Option<f64>) -> Self {
        Self { timestamp, close }
    }
}

/// A provider payload that passed shape validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawChart {
    pub symbol: String,
    pub points: Vec<RawPricePoint>,
    /// Offset of the provider's reporting timezone from UTC, in seconds.
    pub utc_offset_secs: i64,
}

impl RawChart {
    pub fn new(symbol: impl Into<String>, points: Vec<RawPricePoint>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
            utc_offset_secs: 0,
        }
    }
}

/// Structured error types for a single ticker's fetch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("network error for {symbol}: {reason}")]
    Network { symbol: String, reason: String },

    #[error("provider error for {symbol}: {reason}")]
    Provider { symbol: String, reason: String },

    #[error("no usable price points for {symbol}")]
    EmptySeries { symbol: String },

    #[error("data integrity error for {symbol}: close {close} at {timestamp} is not a positive price")]
    DataIntegrity {
        symbol: String,
        timestamp: i64,
        close: f64,
    },

    #[error("fetch for {symbol} cancelled")]
    Cancelled { symbol: String },
}

impl DataError {
    pub fn network(symbol: &str, reason: impl Into<String>) -> Self {
        DataError::Network {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    pub fn provider(symbol: &str, reason: impl Into<String>) -> Self {
        DataError::Provider {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    pub fn cancelled(symbol: &str) -> Self {
        DataError::Cancelled {
            symbol: symbol.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DataError::Cancelled { .. })
    }

    pub fn symbol(&self) -> &str {
        match self {
            DataError::Network { symbol, .. }
            | DataError::Provider { symbol, .. }
            | DataError::EmptySeries { symbol }
            | DataError::DataIntegrity { symbol, .. }
            | DataError::Cancelled { symbol } => symbol,
        }
    }
}

/// Trait for chart-data providers.
///
/// Implementations fetch one symbol's monthly closes for a range. They should
/// check `cancel` before doing I/O and again once a response is in hand,
/// returning [`DataError::Cancelled`] when it is set.
pub trait ChartProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn fetch_chart(
        &self,
        symbol: &str,
        range: ChartRange,
        cancel: &CancelToken,
    ) -> Result<RawChart, DataError>;
}
