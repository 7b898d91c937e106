//! Yahoo Finance chart provider.
//!
//! Fetches monthly closes from Yahoo's v8 chart API. One request per call, no
//! retries: a failed request is reported and the ticker is left out of the
//! chart.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; any deviation from the expected shape is a provider error.

use super::provider::{ChartProvider, DataError, RawChart, RawPricePoint};
use crate::cancel::CancelToken;
use crate::config::{ChartRange, ProviderConfig, MONTHLY_INTERVAL};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Option<Vec<QuoteData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Option<Vec<Option<f64>>>,
}

/// Yahoo Finance chart provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self::with_client(client, &config.base_url))
    }

    /// Use a prebuilt client against `base_url`.
    pub fn with_client(client: reqwest::blocking::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the chart API URL for a symbol and range.
    pub fn chart_url(base_url: &str, symbol: &str, range: ChartRange) -> String {
        let symbol = symbol.replace('^', "%5E");
        format!(
            "{base_url}/v8/finance/chart/{symbol}?range={}&interval={MONTHLY_INTERVAL}",
            range.token()
        )
    }

    /// Parse a chart API body into validated raw points.
    pub fn parse_chart(symbol: &str, body: &str) -> Result<RawChart, DataError> {
        let resp: ChartResponse = serde_json::from_str(body)
            .map_err(|e| DataError::provider(symbol, format!("malformed response: {e}")))?;

        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) => DataError::provider(symbol, format!("{}: {}", err.code, err.description)),
            None => DataError::provider(symbol, "empty result with no error"),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::provider(symbol, "result array is empty"))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| DataError::provider(symbol, "no timestamps"))?;

        let closes = data
            .indicators
            .and_then(|i| i.quote)
            .and_then(|q| q.into_iter().next())
            .and_then(|q| q.close)
            .ok_or_else(|| DataError::provider(symbol, "no close prices"))?;

        if closes.len() != timestamps.len() {
            return Err(DataError::provider(
                symbol,
                format!(
                    "{} timestamps but {} close prices",
                    timestamps.len(),
                    closes.len()
                ),
            ));
        }

        let points = timestamps
            .into_iter()
            .zip(closes)
            .map(|(timestamp, close)| RawPricePoint::new(timestamp, close))
            .collect();

        Ok(RawChart {
            symbol: symbol.to_string(),
            points,
            utc_offset_secs: data.meta.and_then(|m| m.gmtoffset).unwrap_or(0),
        })
    }
}

impl ChartProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_chart(
        &self,
        symbol: &str,
        range: ChartRange,
        cancel: &CancelToken,
    ) -> Result<RawChart, DataError> {
        if cancel.is_cancelled() {
            return Err(DataError::cancelled(symbol));
        }

        let url = Self::chart_url(&self.base_url, symbol, range);
        debug!(symbol, %range, %url, "requesting chart");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| transport_error(symbol, cancel, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::provider(symbol, format!("HTTP {status}")));
        }

        let body = resp
            .text()
            .map_err(|e| transport_error(symbol, cancel, format!("read body: {e}")))?;

        // The request could not be aborted mid-flight; drop the late response.
        if cancel.is_cancelled() {
            return Err(DataError::cancelled(symbol));
        }

        Self::parse_chart(symbol, &body)
    }
}

/// A transport failure on a cancelled request is a cancellation, not an outage.
fn transport_error(symbol: &str, cancel: &CancelToken, reason: String) -> DataError {
    if cancel.is_cancelled() {
        DataError::cancelled(symbol)
    } else {
        DataError::network(symbol, reason)
    }
}
