//! PerfChart Core — normalized performance comparison across a fixed set of tickers.
//!
//! - Chart provider trait and the Yahoo Finance client
//! - Base-100 normalization of monthly closes
//! - Outer join of per-ticker series by month label
//! - Concurrent refresh with per-ticker failure tolerance and superseding cancellation
//! - Series visibility toggles for the rendering layer

pub mod cancel;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod visibility;

pub use cancel::{CancelToken, InFlightSlot};
pub use config::{ChartConfig, ChartRange, ConfigError, ProviderConfig, TickerConfig};
pub use dashboard::{ChartSnapshot, Dashboard, FetchOutcome, RefreshError, RefreshOutcome};
pub use data::{AlignedRow, ChartProvider, DataError, NormalizedPoint, TickerSeries, YahooProvider};
pub use visibility::SeriesVisibility;
