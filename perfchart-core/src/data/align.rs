//! Multi-ticker date alignment.
//!
//! Given normalized series for several tickers, build one row per month
//! label seen in any series. A ticker without a point for a month is simply
//! absent from that row's values (no zero-fill, no forward-fill).

use super::normalize::TickerSeries;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One month of the comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub date_label: String,
    /// Normalized value per symbol; present only where that ticker had data.
    pub values: BTreeMap<String, f64>,
}

impl AlignedRow {
    pub fn new(date_label: impl Into<String>) -> Self {
        Self {
            date_label: date_label.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.values.get(symbol).copied()
    }
}

/// Outer-join `series` on date label, ascending.
///
/// Empty input, or input where every series is empty, yields no rows.
pub fn merge_series(series: &[TickerSeries]) -> Vec<AlignedRow> {
    let mut rows: BTreeMap<&str, AlignedRow> = BTreeMap::new();

    for s in series {
        for point in &s.points {
            rows.entry(point.date_label.as_str())
                .or_insert_with(|| AlignedRow::new(point.date_label.clone()))
                .values
                .insert(s.symbol.clone(), point.value);
        }
    }

    rows.into_values().collect()
}

/// Symbols contributing at least one value, sorted.
pub fn aligned_symbols(rows: &[AlignedRow]) -> Vec<String> {
    rows.iter()
        .flat_map(|row| row.values.keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize::NormalizedPoint;

    fn series(symbol: &str, points: &[(&str, f64)]) -> TickerSeries {
        TickerSeries::new(
            symbol,
            points
                .iter()
                .map(|&(label, value)| NormalizedPoint::new(label, value))
                .collect(),
        )
    }

    fn row(label: &str, values: &[(&str, f64)]) -> AlignedRow {
        AlignedRow {
            date_label: label.into(),
            values: values.iter().map(|&(s, v)| (s.to_string(), v)).collect(),
        }
    }

    #[test]
    fn disjoint_dates_leave_cells_absent() {
        let a = series("A", &[("2024-01", 100.0), ("2024-03", 110.0)]);
        let b = series("B", &[("2024-02", 100.0)]);

        let rows = merge_series(&[a, b]);

        assert_eq!(
            rows,
            vec![
                row("2024-01", &[("A", 100.0)]),
                row("2024-02", &[("B", 100.0)]),
                row("2024-03", &[("A", 110.0)]),
            ]
        );
        assert_eq!(rows[1].get("A"), None);
    }

    #[test]
    fn shared_dates_share_a_row() {
        let a = series("A", &[("2024-01", 100.0), ("2024-02", 105.0)]);
        let b = series("B", &[("2024-01", 100.0), ("2024-02", 95.0)]);

        let rows = merge_series(&[a, b]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("A"), Some(105.0));
        assert_eq!(rows[1].get("B"), Some(95.0));
    }

    #[test]
    fn merge_is_order_independent() {
        let a = series("A", &[("2023-11", 100.0), ("2024-01", 120.0)]);
        let b = series("B", &[("2023-12", 100.0), ("2024-01", 90.0)]);
        assert_eq!(
            merge_series(&[a.clone(), b.clone()]),
            merge_series(&[b, a])
        );
    }

    #[test]
    fn rows_sorted_across_year_boundary() {
        let a = series("A", &[("2024-01", 100.0)]);
        let b = series("B", &[("2023-12", 100.0)]);
        let labels: Vec<String> = merge_series(&[a, b])
            .into_iter()
            .map(|r| r.date_label)
            .collect();
        assert_eq!(labels, vec!["2023-12", "2024-01"]);
    }

    #[test]
    fn no_series_yields_no_rows() {
        assert!(merge_series(&[]).is_empty());
    }

    #[test]
    fn empty_series_yield_no_rows() {
        assert!(merge_series(&[TickerSeries::empty("A"), TickerSeries::empty("B")]).is_empty());
    }

    #[test]
    fn aligned_symbols_lists_contributors() {
        let rows = merge_series(&[
            series("B", &[("2024-01", 100.0)]),
            TickerSeries::empty("C"),
            series("A", &[("2024-02", 100.0)]),
        ]);
        assert_eq!(aligned_symbols(&rows), vec!["A".to_string(), "B".to_string()]);
    }
}
