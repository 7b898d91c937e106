//! Chart data: provider client, normalization and alignment

pub mod align;
pub mod normalize;
pub mod provider;
pub mod yahoo;

pub use align::{aligned_symbols, merge_series, AlignedRow};
pub use normalize::{fetch_series, month_label, normalize, NormalizedPoint, TickerSeries};
pub use provider::{ChartProvider, DataError, RawChart, RawPricePoint};
pub use yahoo::YahooProvider;
