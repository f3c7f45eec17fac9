//! S1 swing detector: 3-bar local-extremum scan with plateau tolerance.

use crate::types::{Swing, SwingKind};

/// Detects swing highs/lows over `[1, N-2]`. Returns an empty vec for
/// `high.len() < 3`.
///
/// A swing-high at `i` requires `high[i] >= high[i-1] && high[i] >= high[i+1]`
/// with at least one neighbor comparison strict (a flat run on both sides
/// is not a local extremum). Swing-lows mirror this over `low`. Both may be
/// emitted for the same `i`; the result is sorted by index ascending (a
/// swing-high is pushed before a swing-low at the same index, which is the
/// order a stable single forward pass naturally produces).
pub fn detect_swings(high: &[f64], low: &[f64]) -> Vec<Swing> {
    let n = high.len();
    if n < 3 {
        return Vec::new();
    }

    let mut swings = Vec::new();
    for i in 1..n - 1 {
        let h = high[i];
        let (h_prev, h_next) = (high[i - 1], high[i + 1]);
        if h >= h_prev && h >= h_next && (h > h_prev || h > h_next) {
            swings.push(Swing {
                index: i,
                kind: SwingKind::SwingHigh,
                price: h,
            });
        }

        let l = low[i];
        let (l_prev, l_next) = (low[i - 1], low[i + 1]);
        if l <= l_prev && l <= l_next && (l < l_prev || l < l_next) {
            swings.push(Swing {
                index: i,
                kind: SwingKind::SwingLow,
                price: l,
            });
        }
    }
    swings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_minimum_length_returns_empty() {
        assert!(detect_swings(&[1.0, 2.0], &[1.0, 2.0]).is_empty());
        assert!(detect_swings(&[], &[]).is_empty());
    }

    #[test]
    fn simple_peak_and_trough() {
        let high = vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0];
        let low = vec![1.0, 2.0, 2.0, 1.0, 2.0, 2.0];
        let swings = detect_swings(&high, &low);
        let highs: Vec<_> = swings.iter().filter(|s| s.is_high()).collect();
        let lows: Vec<_> = swings.iter().filter(|s| s.is_low()).collect();
        assert_eq!(highs.len(), 1);
        assert_eq!(highs[0].index, 2);
        assert_eq!(highs[0].price, 3.0);
        assert_eq!(lows.len(), 1);
        assert_eq!(lows[0].index, 3);
        assert_eq!(lows[0].price, 1.0);
    }

    #[test]
    fn flat_run_on_both_sides_is_not_a_swing() {
        let high = vec![1.0, 2.0, 2.0, 2.0, 1.0];
        let low = vec![1.0, 1.0, 1.0, 1.0, 1.0];
        let swings = detect_swings(&high, &low);
        assert!(swings.iter().all(|s| s.index != 2));
    }

    #[test]
    fn plateau_at_index_produces_candidate_for_each_qualifying_bar() {
        // high=[1,3,3,2,...]: index 1 has h>=h_prev(1) strict, h>=h_next(3) equal -> qualifies
        let high = vec![1.0, 3.0, 3.0, 2.0, 1.0];
        let low = vec![1.0, 1.0, 1.0, 1.0, 1.0];
        let swings = detect_swings(&high, &low);
        let highs: Vec<_> = swings.iter().filter(|s| s.is_high()).map(|s| s.index).collect();
        assert_eq!(highs, vec![1, 2]);
    }

    #[test]
    fn same_bar_can_be_both_high_and_low_swing() {
        let high = vec![1.0, 3.0, 1.0];
        let low = vec![3.0, 1.0, 3.0];
        let swings = detect_swings(&high, &low);
        assert_eq!(swings.len(), 2);
        assert!(swings.iter().any(|s| s.index == 1 && s.is_high()));
        assert!(swings.iter().any(|s| s.index == 1 && s.is_low()));
    }
}
