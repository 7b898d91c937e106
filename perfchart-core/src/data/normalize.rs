//! Base-100 normalization of a ticker's monthly closes.
//!
//! Absent closes are dropped, points are sorted by timestamp, one point is
//! kept per month label, and every close is divided by the first surviving
//! close and scaled by 100.

use super::provider::{ChartProvider, DataError, RawChart};
use crate::cancel::CancelToken;
use crate::config::ChartRange;
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// One month of a normalized series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    /// Zero-padded `YYYY-MM`.
    pub date_label: String,
    pub value: f64,
}

impl NormalizedPoint {
    pub fn new(date_label: impl Into<String>, value: f64) -> Self {
        Self {
            date_label: date_label.into(),
            value,
        }
    }
}

/// A ticker's normalized series, ascending by date label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSeries {
    pub symbol: String,
    pub points: Vec<NormalizedPoint>,
}

impl TickerSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<NormalizedPoint>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Last normalized value, i.e. performance over the whole range.
    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }
}

/// Format epoch seconds, shifted by `utc_offset_secs`, as `YYYY-MM`.
pub fn month_label(timestamp: i64, utc_offset_secs: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp.checked_add(utc_offset_secs)?, 0)
        .map(|dt| dt.format("%Y-%m").to_string())
}

/// Normalize a raw chart to base 100.
pub fn normalize(chart: &RawChart) -> Result<TickerSeries, DataError> {
    let symbol = chart.symbol.as_str();

    let mut pairs: Vec<(i64, f64)> = chart
        .points
        .iter()
        .filter_map(|p| p.close.map(|close| (p.timestamp, close)))
        .collect();

    if pairs.is_empty() {
        return Err(DataError::EmptySeries {
            symbol: symbol.to_string(),
        });
    }

    if let Some(&(timestamp, close)) = pairs.iter().find(|(_, c)| !c.is_finite() || *c <= 0.0) {
        return Err(DataError::DataIntegrity {
            symbol: symbol.to_string(),
            timestamp,
            close,
        });
    }

    // Stable sort keeps provider order among equal timestamps.
    pairs.sort_by_key(|&(timestamp, _)| timestamp);

    // One point per month: a later point in the same month replaces the earlier.
    let mut labelled: Vec<(String, f64)> = Vec::with_capacity(pairs.len());
    for (timestamp, close) in pairs {
        let label = month_label(timestamp, chart.utc_offset_secs).ok_or_else(|| {
            DataError::provider(symbol, format!("invalid timestamp: {timestamp}"))
        })?;
        match labelled.last_mut() {
            Some(last) if last.0 == label => last.1 = close,
            _ => labelled.push((label, close)),
        }
    }

    let base = labelled[0].1;
    let points = labelled
        .into_iter()
        .map(|(date_label, close)| NormalizedPoint {
            date_label,
            value: close / base * 100.0,
        })
        .collect();

    Ok(TickerSeries::new(symbol, points))
}

/// Fetch one ticker from `provider` and normalize it.
pub fn fetch_series(
    provider: &dyn ChartProvider,
    symbol: &str,
    range: ChartRange,
    cancel: &CancelToken,
) -> Result<TickerSeries, DataError> {
    if symbol.trim().is_empty() {
        return Err(DataError::provider(symbol, "empty ticker symbol"));
    }
    let chart = provider.fetch_chart(symbol, range, cancel)?;
    normalize(&chart)
}
