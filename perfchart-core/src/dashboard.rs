//! Refresh orchestration: fetch every ticker concurrently, keep what loaded,
//! align it, and publish the result unless a newer refresh has started.

use crate::cancel::{CancelToken, InFlightSlot};
use crate::config::{ChartRange, TickerConfig};
use crate::data::{
    aligned_symbols, fetch_series, merge_series, AlignedRow, ChartProvider, DataError,
    TickerSeries,
};
use rayon::prelude::*;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced by a refresh.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("no chart data available: all {attempted} data sources failed")]
    AllSourcesFailed {
        attempted: usize,
        failures: Vec<DataError>,
    },

    #[error("failed to build fetch worker pool: {0}")]
    WorkerPool(String),
}

/// Settled result of one ticker's fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded(TickerSeries),
    Failed { symbol: String, error: DataError },
}

impl FetchOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            FetchOutcome::Loaded(series) => &series.symbol,
            FetchOutcome::Failed { symbol, .. } => symbol,
        }
    }
}

/// A committed refresh result, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSnapshot {
    pub range: ChartRange,
    pub rows: Vec<AlignedRow>,
    /// Symbols with at least one value in `rows`, sorted.
    pub symbols: Vec<String>,
    /// Tickers that contributed nothing, and why.
    pub failures: Vec<DataError>,
}

/// What a refresh call resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Ready(ChartSnapshot),
    /// A newer refresh started (or the request was cancelled) before this one
    /// could publish. Not an error.
    Superseded,
}

/// Orchestrates refreshes for a fixed ticker set.
pub struct Dashboard {
    provider: Arc<dyn ChartProvider>,
    tickers: Vec<TickerConfig>,
    pool: rayon::ThreadPool,
    in_flight: InFlightSlot,
    latest: Mutex<Option<ChartSnapshot>>,
}

impl Dashboard {
    pub fn new(
        provider: Arc<dyn ChartProvider>,
        tickers: Vec<TickerConfig>,
    ) -> Result<Self, RefreshError> {
        // Room for a superseded refresh to drain while its successor runs.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(tickers.len().max(1) * 2)
            .thread_name(|i| format!("perfchart-fetch-{i}"))
            .build()
            .map_err(|e| RefreshError::WorkerPool(e.to_string()))?;

        Ok(Self {
            provider,
            tickers,
            pool,
            in_flight: InFlightSlot::new(),
            latest: Mutex::new(None),
        })
    }

    pub fn tickers(&self) -> &[TickerConfig] {
        &self.tickers
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The last committed snapshot, if any.
    pub fn latest(&self) -> Option<ChartSnapshot> {
        self.latest_lock().clone()
    }

    /// Cancel the in-flight refresh, if there is one.
    pub fn cancel_in_flight(&self) -> bool {
        self.in_flight.cancel_current()
    }

    /// Fetch every ticker for `range`, superseding any refresh still running.
    ///
    /// Fails only when no ticker produced data. Individual failures are logged
    /// and recorded in the snapshot's `failures`.
    pub fn refresh(&self, range: ChartRange) -> Result<RefreshOutcome, RefreshError> {
        let cancel = self.in_flight.begin();
        info!(
            %range,
            tickers = self.tickers.len(),
            provider = self.provider.name(),
            "refresh started"
        );

        let outcomes = self.fetch_all(range, &cancel);
        let result = self.settle(range, outcomes, &cancel);

        self.in_flight.finish(&cancel);
        result
    }

    /// Fan out one fetch per ticker and wait for all of them to settle.
    fn fetch_all(&self, range: ChartRange, cancel: &CancelToken) -> Vec<FetchOutcome> {
        let provider = self.provider.as_ref();
        self.pool.install(|| {
            self.tickers
                .par_iter()
                .with_max_len(1)
                .map(|ticker| match fetch_series(provider, &ticker.symbol, range, cancel) {
                    Ok(series) => FetchOutcome::Loaded(series),
                    Err(error) => FetchOutcome::Failed {
                        symbol: ticker.symbol.clone(),
                        error,
                    },
                })
                .collect()
        })
    }

    fn settle(
        &self,
        range: ChartRange,
        outcomes: Vec<FetchOutcome>,
        cancel: &CancelToken,
    ) -> Result<RefreshOutcome, RefreshError> {
        let attempted = outcomes.len();
        let mut loaded = Vec::with_capacity(attempted);
        let mut failures = Vec::new();

        for outcome in outcomes {
            match outcome {
                FetchOutcome::Loaded(series) if !series.is_empty() => {
                    debug!(symbol = %series.symbol, points = series.len(), "series loaded");
                    loaded.push(series);
                }
                FetchOutcome::Loaded(series) => {
                    warn!(symbol = %series.symbol, "series loaded with no points, skipping");
                    failures.push(DataError::EmptySeries {
                        symbol: series.symbol,
                    });
                }
                FetchOutcome::Failed { symbol, error } if error.is_cancelled() => {
                    debug!(%symbol, "fetch cancelled");
                    failures.push(error);
                }
                FetchOutcome::Failed { symbol, error } => {
                    warn!(%symbol, error = %error, "ticker contributed no data");
                    failures.push(error);
                }
            }
        }

        // Whether this refresh may still publish is decided under the slot
        // lock, for failures as well as snapshots.
        if loaded.is_empty() {
            if !self.in_flight.commit_if_current(cancel, || {}) {
                debug!(%range, "refresh superseded, dropping its failures");
                return Ok(RefreshOutcome::Superseded);
            }
            warn!(%range, attempted, "all data sources failed");
            return Err(RefreshError::AllSourcesFailed {
                attempted,
                failures,
            });
        }

        let rows = merge_series(&loaded);
        let snapshot = ChartSnapshot {
            range,
            symbols: aligned_symbols(&rows),
            rows,
            failures,
        };

        let committed = self.in_flight.commit_if_current(cancel, || {
            *self.latest_lock() = Some(snapshot.clone());
        });
        if !committed {
            debug!(%range, "refresh superseded before commit");
            return Ok(RefreshOutcome::Superseded);
        }

        info!(
            %range,
            rows = snapshot.rows.len(),
            loaded = snapshot.symbols.len(),
            failed = snapshot.failures.len(),
            "refresh committed"
        );
        Ok(RefreshOutcome::Ready(snapshot))
    }

    fn latest_lock(&self) -> MutexGuard<'_, Option<ChartSnapshot>> {
        self.latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
