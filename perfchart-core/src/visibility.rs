//! Per-series display toggles consumed by the rendering layer.

use crate::config::TickerConfig;
use crate::data::AlignedRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Symbol → enabled. Symbols never registered are treated as visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesVisibility {
    enabled: BTreeMap<String, bool>,
}

impl SeriesVisibility {
    /// Every configured ticker starts visible.
    pub fn all_visible(tickers: &[TickerConfig]) -> Self {
        Self {
            enabled: tickers.iter().map(|t| (t.symbol.clone(), true)).collect(),
        }
    }

    pub fn is_visible(&self, symbol: &str) -> bool {
        self.enabled.get(symbol).copied().unwrap_or(true)
    }

    pub fn set(&mut self, symbol: &str, visible: bool) {
        self.enabled.insert(symbol.to_string(), visible);
    }

    pub fn show(&mut self, symbol: &str) {
        self.set(symbol, true);
    }

    pub fn hide(&mut self, symbol: &str) {
        self.set(symbol, false);
    }

    /// Flip a symbol and return its new state.
    pub fn toggle(&mut self, symbol: &str) -> bool {
        let visible = !self.is_visible(symbol);
        self.set(symbol, visible);
        visible
    }

    /// Visible symbols among `symbols`, in the given order.
    pub fn visible<'a>(&self, symbols: &'a [String]) -> Vec<&'a str> {
        symbols
            .iter()
            .map(String::as_str)
            .filter(|s| self.is_visible(s))
            .collect()
    }

    /// Rows restricted to visible series; rows left with no values are dropped.
    pub fn apply(&self, rows: &[AlignedRow]) -> Vec<AlignedRow> {
        rows.iter()
            .filter_map(|row| {
                let values: BTreeMap<String, f64> = row
                    .values
                    .iter()
                    .filter(|(symbol, _)| self.is_visible(symbol))
                    .map(|(symbol, value)| (symbol.clone(), *value))
                    .collect();
                (!values.is_empty()).then(|| AlignedRow {
                    date_label: row.date_label.clone(),
                    values,
                })
            })
            .collect()
    }
}
