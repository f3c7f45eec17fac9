//! Property-based tests for the universal invariants of spec.md §8.
//!
//! Grounded on the teacher's `dev-dependencies` `proptest = "1"` (already
//! used for its own pattern-detector invariants).

use proptest::prelude::*;

use market_structure::prelude::*;

/// Generates a random-walk OHLC series of exactly `len` bars. Wicks are
/// built from the body outward (`high = max(open,close) + up_wick`, `low =
/// min(open,close) - down_wick`) so every OHLC invariant the analyzer
/// assumes holds by construction.
fn series_strategy(len: usize) -> impl Strategy<Value = OhlcSeries> {
    let drifts = proptest::collection::vec(-3.0..3.0f64, len.saturating_sub(1));
    let wicks = proptest::collection::vec((0.0..2.0f64, 0.0..2.0f64), len);

    (drifts, wicks).prop_map(move |(drifts, wicks)| {
        let mut closes = vec![100.0f64];
        for d in &drifts {
            closes.push(closes.last().unwrap() + d);
        }

        let mut open = Vec::with_capacity(len);
        let mut high = Vec::with_capacity(len);
        let mut low = Vec::with_capacity(len);
        let mut close = Vec::with_capacity(len);
        for i in 0..len {
            let o = if i == 0 { closes[0] } else { closes[i - 1] };
            let c = closes[i];
            let (up_wick, down_wick) = wicks[i];
            open.push(o);
            high.push(o.max(c) + up_wick);
            low.push(o.min(c) - down_wick);
            close.push(c);
        }
        OhlcSeries::new(open, high, low, close).unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Invariant 1: every swing's price equals the corresponding high/low.
    #[test]
    fn swing_price_matches_bar_at_index(series in series_strategy(40)) {
        let swings = market_structure::swings::detect_swings(&series.high, &series.low);
        for s in &swings {
            match s.kind {
                SwingKind::SwingHigh => prop_assert_eq!(s.price, series.high[s.index]),
                SwingKind::SwingLow => prop_assert_eq!(s.price, series.low[s.index]),
            }
        }
    }

    /// Invariant 2: after S2, swing kinds strictly alternate.
    #[test]
    fn external_structure_alternates(series in series_strategy(40)) {
        let swings = market_structure::swings::detect_swings(&series.high, &series.low);
        let external = market_structure::external::extract_external_structure(&swings);
        for pair in external.windows(2) {
            prop_assert_ne!(pair[0].kind, pair[1].kind);
        }
    }

    /// Invariant 3: every break event's index is strictly after its swing,
    /// and the break predicate holds at that bar.
    #[test]
    fn break_index_is_after_swing_and_predicate_holds(series in series_strategy(40)) {
        let swings = market_structure::swings::detect_swings(&series.high, &series.low);
        let external = market_structure::external::extract_external_structure(&swings);
        let scan = market_structure::bos::scan_breaks(&series.open, &series.high, &series.low, &series.close, &external);

        for swing in &external {
            if let Some(break_index) = scan.break_map.get(&swing.index).copied().flatten() {
                prop_assert!(break_index > swing.index);
                let (o, h, l, c) = (
                    series.open[break_index],
                    series.high[break_index],
                    series.low[break_index],
                    series.close[break_index],
                );
                let holds = match swing.kind {
                    SwingKind::SwingHigh => market_structure::breaks::is_valid_high_break(o, c, h, l, swing.price),
                    SwingKind::SwingLow => market_structure::breaks::is_valid_low_break(o, c, h, l, swing.price),
                };
                prop_assert!(holds);
            }
        }
    }

    /// Invariant 4: at most one MSS marker per call.
    #[test]
    fn at_most_one_mss_marker(series in series_strategy(60)) {
        let overlay = analyze(&series, &AnalyzeOptions::default());
        let mss_count = overlay
            .markers
            .iter()
            .filter(|m| matches!(m.kind, MarkerKind::MssBearish | MarkerKind::MssBullish))
            .count();
        prop_assert!(mss_count <= 1);
    }

    /// Invariant 6: `markers_count` in debug_info equals the filtered marker count.
    #[test]
    fn debug_info_marker_count_matches(series in series_strategy(40)) {
        for mode in [VisibilityMode::All, VisibilityMode::ProtectedOnly, VisibilityMode::LevelsOnly, VisibilityMode::MarkersOnly] {
            let overlay = analyze(&series, &AnalyzeOptions::with_visibility(mode));
            prop_assert_eq!(overlay.debug_info().markers_count, overlay.markers.len());
        }
    }

    /// Invariant 7: idempotence.
    #[test]
    fn analyze_is_idempotent(series in series_strategy(50)) {
        let options = AnalyzeOptions::default();
        let first = analyze(&series, &options);
        let second = analyze(&series, &options);
        prop_assert_eq!(first.markers, second.markers);
        prop_assert_eq!(first.levels, second.levels);
    }

    /// Invariant 8: `protected-only` output contains only "protected" kinds.
    #[test]
    fn protected_only_contains_only_protected_kinds(series in series_strategy(50)) {
        let overlay = analyze(&series, &AnalyzeOptions::with_visibility(VisibilityMode::ProtectedOnly));
        for m in &overlay.markers {
            prop_assert!(m.kind.is_protected());
        }
        for l in &overlay.levels {
            prop_assert!(l.kind.is_protected());
        }
    }

    /// Invariant 9: per-kind non-protected level cap <= 24.
    #[test]
    fn non_protected_level_cap_is_respected(series in series_strategy(200)) {
        let overlay = analyze(&series, &AnalyzeOptions::default());
        let mut counts = std::collections::HashMap::new();
        for l in &overlay.levels {
            if !l.kind.is_protected() {
                *counts.entry(l.kind).or_insert(0) += 1;
            }
        }
        for count in counts.values() {
            prop_assert!(*count <= 24);
        }
    }
}
