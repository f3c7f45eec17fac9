//! S3 BOS scanner: for each external swing, finds the first valid break
//! candle and records it in a break map.

use std::collections::HashMap;

use crate::breaks::{is_valid_high_break, is_valid_low_break};
use crate::types::{Marker, MarkerKind, Swing, SwingKind};

/// Maps an external swing's bar index to the bar index of its first valid
/// break, or `None` if the swing was never broken within the series.
pub type BreakMap = HashMap<usize, Option<usize>>;

/// Output of the BOS scan: the break map plus the `bos-*` and `swing-*`
/// markers, in scan order (BOS markers first, then swing markers — matching
/// the order the enrichment stage expects to find them in).
pub struct BosScan {
    pub break_map: BreakMap,
    pub markers: Vec<Marker>,
}

/// For each external swing, scans forward for the first candle breaking its
/// price and records the break bar in the returned [`BreakMap`].
///
/// `open`/`high`/`low`/`close` must all have length `n`; `swings` indices
/// must be `< n` (guaranteed by the caller, which only ever passes swings
/// produced from the same arrays).
pub fn scan_breaks(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    swings: &[Swing],
) -> BosScan {
    let n = close.len();
    let mut break_map = BreakMap::new();
    let mut markers = Vec::new();

    for swing in swings {
        let idx = swing.index;
        if idx >= n {
            break_map.insert(idx, None);
            continue;
        }

        let mut break_index = None;
        match swing.kind {
            SwingKind::SwingHigh => {
                for j in idx + 1..n {
                    if is_valid_high_break(open[j], close[j], high[j], low[j], swing.price) {
                        break_index = Some(j);
                        markers.push(Marker {
                            index: j,
                            kind: MarkerKind::BosBullish,
                            value: high[j],
                        });
                        break;
                    }
                }
            }
            SwingKind::SwingLow => {
                for j in idx + 1..n {
                    if is_valid_low_break(open[j], close[j], high[j], low[j], swing.price) {
                        break_index = Some(j);
                        markers.push(Marker {
                            index: j,
                            kind: MarkerKind::BosBearish,
                            value: low[j],
                        });
                        break;
                    }
                }
            }
        }
        break_map.insert(idx, break_index);
    }

    for swing in swings {
        markers.push(Marker {
            index: swing.index,
            kind: if swing.is_high() {
                MarkerKind::SwingHigh
            } else {
                MarkerKind::SwingLow
            },
            value: swing.price,
        });
    }

    BosScan { break_map, markers }
}
