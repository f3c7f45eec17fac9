//! S4 structural enrichment: HSH/LSL tracking, break events with
//! impulse-origin swings, trend, Protected High/Low with sweep refinement,
//! and MSC/MSS events.

use crate::bos::BreakMap;
use crate::breaks::{is_valid_high_break, is_valid_low_break};
use crate::types::{
    Anchor, BreakEvent, Level, LevelKind, Marker, MarkerKind, ProtectedLevel, Swing, SwingKind,
    Trend,
};

/// Output of the enrichment pass.
pub struct Enrichment {
    pub markers: Vec<Marker>,
    pub levels: Vec<Level>,
    pub trend: Trend,
    pub protected_low: Option<ProtectedLevel>,
    pub protected_high: Option<ProtectedLevel>,
}

/// Runs the full structural enrichment pass over the external swing list.
pub fn enrich(
    external: &[Swing],
    break_map: &BreakMap,
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
) -> Enrichment {
    let mut markers = Vec::new();
    let mut levels = Vec::new();

    if external.is_empty() {
        return Enrichment {
            markers,
            levels,
            trend: Trend::None,
            protected_low: None,
            protected_high: None,
        };
    }

    let n = close.len();
    let last_external_index = external.last().unwrap().index;

    let mut last_hsh: Option<Swing> = None;
    let mut last_lsl: Option<Swing> = None;
    let mut bull_events: Vec<BreakEvent> = Vec::new();
    let mut bear_events: Vec<BreakEvent> = Vec::new();
    let mut last_bull_break: Option<BreakEvent> = None;
    let mut last_bear_break: Option<BreakEvent> = None;

    for idx in 0..external.len() {
        let swing = external[idx];
        let break_idx = break_map.get(&swing.index).copied().flatten();

        if swing.is_high() {
            let promote = last_hsh.map_or(true, |h| swing.price > h.price);
            if promote {
                last_hsh = Some(swing);
                markers.push(Marker {
                    index: swing.index,
                    kind: MarkerKind::Hsh,
                    value: swing.price,
                });
                levels.push(Level {
                    from: swing.index,
                    to: break_idx.unwrap_or(last_external_index),
                    price: swing.price,
                    kind: LevelKind::HshLevel,
                });
            }

            if let Some(j) = break_idx {
                if let Some(origin) = find_origin(external, idx, j, SwingKind::SwingLow) {
                    let event = BreakEvent {
                        swing_index: swing.index,
                        swing_price: swing.price,
                        break_index: j,
                        origin,
                        swing_was_promoted: promote,
                    };
                    bull_events.push(event);
                    if last_bull_break.map_or(true, |e| event.break_index >= e.break_index) {
                        last_bull_break = Some(event);
                    }
                }
            }
        } else {
            let promote = last_lsl.map_or(true, |l| swing.price < l.price);
            if promote {
                last_lsl = Some(swing);
                markers.push(Marker {
                    index: swing.index,
                    kind: MarkerKind::Lsl,
                    value: swing.price,
                });
                levels.push(Level {
                    from: swing.index,
                    to: break_idx.unwrap_or(last_external_index),
                    price: swing.price,
                    kind: LevelKind::LslLevel,
                });
            }

            if let Some(j) = break_idx {
                if let Some(origin) = find_origin(external, idx, j, SwingKind::SwingHigh) {
                    let event = BreakEvent {
                        swing_index: swing.index,
                        swing_price: swing.price,
                        break_index: j,
                        origin,
                        swing_was_promoted: promote,
                    };
                    bear_events.push(event);
                    if last_bear_break.map_or(true, |e| event.break_index >= e.break_index) {
                        last_bear_break = Some(event);
                    }
                }
            }
        }
    }

    let trend = match (last_bull_break, last_bear_break) {
        (None, None) => Trend::None,
        (Some(_), None) => Trend::Bullish,
        (None, Some(_)) => Trend::Bearish,
        (Some(b), Some(be)) => {
            if b.break_index >= be.break_index {
                Trend::Bullish
            } else {
                Trend::Bearish
            }
        }
    };

    let mut protected_low = None;
    let mut protected_high = None;

    if trend == Trend::Bullish {
        let bull_break = last_bull_break.expect("bullish trend implies a bull break");
        let segment = trend_segment(&bull_events, last_bear_break.map(|e| e.break_index));
        let mut pl = derive_protected(&segment, bull_break, true);

        // Sweep refinement: widen PL toward any bar whose wick dipped below it
        // while the body stayed safe, never moving its index.
        let start = pl.index + 1;
        let end = bull_break.break_index;
        if start <= end && end < n {
            let mut best: Option<usize> = None;
            for j in start..=end {
                let sweep = low[j] < pl.price && open[j].min(close[j]) > pl.price;
                if sweep {
                    let better = match best {
                        None => true,
                        Some(b) => low[j] <= low[b],
                    };
                    if better {
                        best = Some(j);
                    }
                }
            }
            if let Some(j) = best {
                pl.price = low[j];
            }
        }
        protected_low = Some(pl);

        markers.push(Marker {
            index: pl.index,
            kind: MarkerKind::ProtectedLow,
            value: pl.price,
        });
        levels.push(Level {
            from: pl.index,
            to: last_external_index,
            price: pl.price,
            kind: LevelKind::ProtectedLow,
        });

        if segment.len() > 1 {
            for event in &segment[1..] {
                markers.push(Marker {
                    index: event.break_index,
                    kind: MarkerKind::MscBullish,
                    value: high[event.break_index],
                });
                levels.push(Level {
                    from: event.origin.index,
                    to: event.break_index,
                    price: event.origin.price,
                    kind: LevelKind::MscLeg,
                });
            }
        }
    } else if trend == Trend::Bearish {
        let bear_break = last_bear_break.expect("bearish trend implies a bear break");
        let segment = trend_segment(&bear_events, last_bull_break.map(|e| e.break_index));
        let mut ph = derive_protected(&segment, bear_break, false);

        let start = ph.index + 1;
        let end = bear_break.break_index;
        if start <= end && end < n {
            let mut best: Option<usize> = None;
            for j in start..=end {
                let sweep = high[j] > ph.price && open[j].max(close[j]) < ph.price;
                if sweep {
                    let better = match best {
                        None => true,
                        Some(b) => high[j] >= high[b],
                    };
                    if better {
                        best = Some(j);
                    }
                }
            }
            if let Some(j) = best {
                ph.price = high[j];
            }
        }
        protected_high = Some(ph);

        markers.push(Marker {
            index: ph.index,
            kind: MarkerKind::ProtectedHigh,
            value: ph.price,
        });
        levels.push(Level {
            from: ph.index,
            to: last_external_index,
            price: ph.price,
            kind: LevelKind::ProtectedHigh,
        });

        if segment.len() > 1 {
            for event in &segment[1..] {
                markers.push(Marker {
                    index: event.break_index,
                    kind: MarkerKind::MscBearish,
                    value: low[event.break_index],
                });
                levels.push(Level {
                    from: event.origin.index,
                    to: event.break_index,
                    price: event.origin.price,
                    kind: LevelKind::MscLeg,
                });
            }
        }
    }

    // HSH/LSL sweep refinement: in-trend only, widened toward any wick that
    // overshoots the running extreme without a valid break occurring first.
    if trend == Trend::Bullish {
        if let Some(mut h) = last_hsh {
            let mut sweeps = Vec::new();
            for j in h.index + 1..n {
                if is_valid_high_break(open[j], close[j], high[j], low[j], h.price) {
                    break;
                }
                if high[j] > h.price && open[j].max(close[j]) < h.price {
                    sweeps.push(j);
                }
            }
            let mut best_sweep: Option<usize> = None;
            for &j in &sweeps {
                let better = match best_sweep {
                    None => true,
                    Some(b) => high[j] >= high[b],
                };
                if better {
                    best_sweep = Some(j);
                }
            }
            if let Some(best) = best_sweep {
                let new_price = high[best];
                h.price = new_price;
                for &j in &sweeps {
                    levels.push(Level {
                        from: j,
                        to: j,
                        price: high[j],
                        kind: LevelKind::HshSweep,
                    });
                }
                for lvl in levels.iter_mut() {
                    if lvl.kind == LevelKind::HshLevel && lvl.from == h.index {
                        lvl.price = new_price;
                    }
                }
            }
        }
    } else if trend == Trend::Bearish {
        if let Some(mut l) = last_lsl {
            let mut sweeps = Vec::new();
            for j in l.index + 1..n {
                if is_valid_low_break(open[j], close[j], high[j], low[j], l.price) {
                    break;
                }
                if low[j] < l.price && open[j].min(close[j]) > l.price {
                    sweeps.push(j);
                }
            }
            let mut best_sweep: Option<usize> = None;
            for &j in &sweeps {
                let better = match best_sweep {
                    None => true,
                    Some(b) => low[j] <= low[b],
                };
                if better {
                    best_sweep = Some(j);
                }
            }
            if let Some(best) = best_sweep {
                let new_price = low[best];
                l.price = new_price;
                for &j in &sweeps {
                    levels.push(Level {
                        from: j,
                        to: j,
                        price: low[j],
                        kind: LevelKind::LslSweep,
                    });
                }
                for lvl in levels.iter_mut() {
                    if lvl.kind == LevelKind::LslLevel && lvl.from == l.index {
                        lvl.price = new_price;
                    }
                }
            }
        }
    }

    // MSS: at most one per call, bearish preferred over bullish.
    let mut mss_fired = false;

    if trend == Trend::Bullish {
        if let (Some(pl), Some(bull_break)) = (protected_low, last_bull_break) {
            let start = (pl.index + 1).max(bull_break.break_index + 1);
            for j in start..n {
                if is_valid_low_break(open[j], close[j], high[j], low[j], pl.price) {
                    markers.push(Marker {
                        index: j,
                        kind: MarkerKind::MssBearish,
                        value: low[j],
                    });
                    levels.push(Level {
                        from: pl.index,
                        to: j,
                        price: pl.price,
                        kind: LevelKind::ProtectedLow,
                    });
                    if let Some(sh) = external.iter().rev().find(|s| s.is_high() && s.index <= j) {
                        markers.push(Marker {
                            index: sh.index,
                            kind: MarkerKind::ProtectedHigh,
                            value: sh.price,
                        });
                        levels.push(Level {
                            from: sh.index,
                            to: last_external_index,
                            price: sh.price,
                            kind: LevelKind::ProtectedHigh,
                        });
                    }
                    mss_fired = true;
                    break;
                }
            }
        }
    }

    if !mss_fired && trend == Trend::Bearish {
        if let (Some(ph), Some(bear_break)) = (protected_high, last_bear_break) {
            let start = (ph.index + 1).max(bear_break.break_index + 1);
            for j in start..n {
                if is_valid_high_break(open[j], close[j], high[j], low[j], ph.price) {
                    markers.push(Marker {
                        index: j,
                        kind: MarkerKind::MssBullish,
                        value: high[j],
                    });
                    levels.push(Level {
                        from: ph.index,
                        to: j,
                        price: ph.price,
                        kind: LevelKind::ProtectedHigh,
                    });
                    if let Some(sl) = external.iter().rev().find(|s| s.is_low() && s.index <= j) {
                        markers.push(Marker {
                            index: sl.index,
                            kind: MarkerKind::ProtectedLow,
                            value: sl.price,
                        });
                        levels.push(Level {
                            from: sl.index,
                            to: last_external_index,
                            price: sl.price,
                            kind: LevelKind::ProtectedLow,
                        });
                    }
                    break;
                }
            }
        }
    }

    Enrichment {
        markers,
        levels,
        trend,
        protected_low,
        protected_high,
    }
}

/// Events whose `break_index` is strictly after the opposite trend's last
/// break, or all events when there is no opposite break yet.
fn trend_segment(events: &[BreakEvent], opposite_last_break: Option<usize>) -> Vec<BreakEvent> {
    match opposite_last_break {
        Some(ob) => events.iter().copied().filter(|e| e.break_index > ob).collect(),
        None => events.to_vec(),
    }
}

/// Derives a Protected Low/High from a trend segment: prefer the subset
/// whose swing was promoted to HSH/LSL at scan time, else the whole segment;
/// take the minimum (PL) or maximum (PH) origin price, latest wins on ties.
/// Falls back to the trend-defining break's own origin when the segment is
/// empty (the exact-tie edge case the segment filter's strict `>` excludes).
fn derive_protected(segment: &[BreakEvent], trend_break: BreakEvent, minimize: bool) -> ProtectedLevel {
    if segment.is_empty() {
        return ProtectedLevel {
            index: trend_break.origin.index,
            price: trend_break.origin.price,
        };
    }

    let preferred: Vec<BreakEvent> =
        segment.iter().copied().filter(|e| e.swing_was_promoted).collect();
    let chosen: &[BreakEvent] = if preferred.is_empty() { segment } else { &preferred };

    let mut best = chosen[0];
    for &e in &chosen[1..] {
        let better = if minimize {
            e.origin.price <= best.origin.price
        } else {
            e.origin.price >= best.origin.price
        };
        if better {
            best = e;
        }
    }
    ProtectedLevel {
        index: best.origin.index,
        price: best.origin.price,
    }
}

/// Impulse origin for the break at `j` of `external[idx]`: the opposite-kind
/// swing with the most extreme price strictly between `idx` and the first
/// external position at or after `j` (latest wins on ties); falling back to
/// the nearest opposite-kind swing at an earlier position when none lies
/// between the swing and its break.
fn find_origin(external: &[Swing], idx: usize, j: usize, wanted: SwingKind) -> Option<Anchor> {
    let mut k = idx + 1;
    while k < external.len() && external[k].index < j {
        k += 1;
    }
    let candidates = &external[idx + 1..k];

    let mut best: Option<Swing> = None;
    for &c in candidates {
        if c.kind != wanted {
            continue;
        }
        let better = match best {
            None => true,
            Some(b) => match wanted {
                SwingKind::SwingLow => c.price <= b.price,
                SwingKind::SwingHigh => c.price >= b.price,
            },
        };
        if better {
            best = Some(c);
        }
    }

    if let Some(b) = best {
        return Some(Anchor { index: b.index, price: b.price });
    }

    external[..idx]
        .iter()
        .rev()
        .find(|s| s.kind == wanted)
        .map(|s| Anchor { index: s.index, price: s.price })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bos::scan_breaks;
    use crate::external::extract_external_structure;
    use crate::swings::detect_swings;

    fn run(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Enrichment {
        let swings = detect_swings(high, low);
        let external = extract_external_structure(&swings);
        let scan = scan_breaks(open, high, low, close, &external);
        enrich(&external, &scan.break_map, open, high, low, close)
    }

    #[test]
    fn uptrend_with_single_break_is_bullish() {
        let close = vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0];
        let high = vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0];
        let low = vec![1.0, 2.0, 2.0, 1.0, 2.0, 2.0];
        let open = close.clone();

        let result = run(&open, &high, &low, &close);
        assert_eq!(result.trend, Trend::Bullish);
        let pl = result.protected_low.expect("PL must be set");
        assert_eq!(pl.index, 3);
        assert_eq!(pl.price, 1.0);
        assert!(result
            .markers
            .iter()
            .any(|m| m.kind == MarkerKind::ProtectedLow && m.index == 3));
    }

    #[test]
    fn no_breaks_means_no_trend_and_no_protected_level() {
        let high = vec![1.0, 2.0, 1.5, 1.8, 1.2];
        let low = vec![0.5, 1.0, 0.8, 1.1, 0.7];
        let open = low.clone();
        let close = high.clone();

        let result = run(&open, &high, &low, &close);
        assert_eq!(result.trend, Trend::None);
        assert!(result.protected_low.is_none());
        assert!(result.protected_high.is_none());
    }

    #[test]
    fn at_most_one_mss_marker() {
        // Uptrend into PL at index 3, a confirming higher break that keeps
        // the trend bullish, then a clean low break below PL that flips
        // structure exactly once.
        let open = vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 4.5, 4.5, 6.0, 0.4];
        let high = vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 5.0, 4.8, 6.2, 6.5];
        let low = vec![1.0, 2.0, 2.0, 1.0, 2.0, 2.0, 2.0, 1.5, 0.3, 0.2];
        let close = vec![1.0, 2.0, 3.0, 1.5, 3.0, 4.0, 4.0, 4.2, 0.5, 0.2];

        let result = run(&open, &high, &low, &close);
        assert_eq!(result.trend, Trend::Bullish);
        let pl = result.protected_low.expect("PL must be set");
        assert_eq!(pl.index, 3);
        assert_eq!(pl.price, 1.0);
        let mss_count = result
            .markers
            .iter()
            .filter(|m| matches!(m.kind, MarkerKind::MssBearish | MarkerKind::MssBullish))
            .count();
        assert_eq!(mss_count, 1);
        assert!(result
            .markers
            .iter()
            .any(|m| m.kind == MarkerKind::MssBearish && m.index == 9));
    }

    #[test]
    fn bullish_continuation_emits_an_msc_leg() {
        // Two successive bullish breaks off the same PL: the first
        // establishes the trend, the second is a continuation leg.
        let open = vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 4.5, 4.5, 5.5];
        let high = vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 5.0, 4.8, 5.8];
        let low = vec![1.0, 2.0, 2.0, 1.0, 2.0, 2.0, 2.0, 1.5, 1.2];
        let close = vec![1.0, 2.0, 3.0, 1.5, 3.0, 4.0, 4.0, 4.2, 5.6];

        let result = run(&open, &high, &low, &close);
        assert_eq!(result.trend, Trend::Bullish);
        let pl = result.protected_low.expect("PL must be set");
        assert_eq!(pl.index, 3);
        assert_eq!(pl.price, 1.0);
        assert!(result
            .markers
            .iter()
            .any(|m| m.kind == MarkerKind::MscBullish && m.index == 8));
    }
}
