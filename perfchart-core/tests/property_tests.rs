//! Property tests for the normalization and alignment invariants.
//!
//! Uses proptest to verify:
//! 1. Base 100 — the first normalized value is exactly 100
//! 2. Positivity — positive closes never normalize to a non-positive value
//! 3. No absent closes survive normalization
//! 4. Merge order independence and sparse rows

use proptest::prelude::*;
use perfchart_core::data::{
    merge_series, normalize, NormalizedPoint, RawChart, RawPricePoint, TickerSeries,
};
use std::collections::BTreeSet;

const JAN_2000: i64 = 946_684_800;
const MONTH: i64 = 31 * 86_400;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_close() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        4 => (0.01..100_000.0_f64).prop_map(Some),
    ]
}

fn arb_chart() -> impl Strategy<Value = RawChart> {
    prop::collection::vec(arb_close(), 1..60).prop_map(|closes| {
        let points = closes
            .into_iter()
            .enumerate()
            .map(|(i, close)| RawPricePoint::new(JAN_2000 + i as i64 * MONTH, close))
            .collect();
        RawChart::new("A", points)
    })
}

fn arb_series(symbol: &'static str) -> impl Strategy<Value = TickerSeries> {
    prop::collection::btree_set(0u32..48, 0..24).prop_map(move |months| {
        let points = months
            .into_iter()
            .map(|m| {
                NormalizedPoint::new(
                    format!("{:04}-{:02}", 2020 + m / 12, m % 12 + 1),
                    100.0 + m as f64,
                )
            })
            .collect();
        TickerSeries::new(symbol, points)
    })
}

// ── 1–3. Normalization ───────────────────────────────────────────────

proptest! {
    #[test]
    fn first_value_is_base_100(chart in arb_chart()) {
        prop_assume!(chart.points.iter().any(|p| p.close.is_some()));
        let series = normalize(&chart).unwrap();
        prop_assert_eq!(series.points[0].value, 100.0);
    }

    #[test]
    fn positive_closes_stay_positive(chart in arb_chart()) {
        prop_assume!(chart.points.iter().any(|p| p.close.is_some()));
        let series = normalize(&chart).unwrap();
        prop_assert!(series.points.iter().all(|p| p.value > 0.0 && p.value.is_finite()));
    }

    #[test]
    fn one_point_per_present_close(chart in arb_chart()) {
        let present = chart.points.iter().filter(|p| p.close.is_some()).count();
        match normalize(&chart) {
            Ok(series) => prop_assert_eq!(series.len(), present),
            Err(_) => prop_assert_eq!(present, 0),
        }
    }

    #[test]
    fn labels_strictly_ascending(chart in arb_chart()) {
        if let Ok(series) = normalize(&chart) {
            for pair in series.points.windows(2) {
                prop_assert!(pair[0].date_label < pair[1].date_label);
            }
        }
    }
}

// ── 4. Alignment ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn merge_is_order_independent(a in arb_series("A"), b in arb_series("B"), c in arb_series("C")) {
        let forward = merge_series(&[a.clone(), b.clone(), c.clone()]);
        let backward = merge_series(&[c, b, a]);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn rows_cover_the_union_of_labels(a in arb_series("A"), b in arb_series("B")) {
        let expected: BTreeSet<String> = a
            .points
            .iter()
            .chain(b.points.iter())
            .map(|p| p.date_label.clone())
            .collect();
        let rows = merge_series(&[a, b]);
        let labels: Vec<String> = rows.iter().map(|r| r.date_label.clone()).collect();
        prop_assert_eq!(labels, expected.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn rows_hold_only_present_tickers(a in arb_series("A"), b in arb_series("B")) {
        let rows = merge_series(&[a.clone(), b.clone()]);
        for row in &rows {
            let a_has = a.points.iter().any(|p| p.date_label == row.date_label);
            let b_has = b.points.iter().any(|p| p.date_label == row.date_label);
            prop_assert_eq!(row.values.contains_key("A"), a_has);
            prop_assert_eq!(row.values.contains_key("B"), b_has);
            prop_assert!(!row.values.is_empty());
        }
    }
}
