//! Break predicates: whether a single candle validly breaches a level.
//!
//! The equality branch matters: an exact touch with the body resting on the
//! level is not a break, but an exact touch with the wick pushing through is.

/// True if `(o, c, h, l)` validly breaks above `level`.
#[inline]
pub fn is_valid_high_break(o: f64, c: f64, h: f64, _l: f64, level: f64) -> bool {
    let body_top = o.max(c);
    h >= level && (body_top > level || (body_top == level && h > level))
}

/// True if `(o, c, h, l)` validly breaks below `level`.
#[inline]
pub fn is_valid_low_break(o: f64, c: f64, _h: f64, l: f64, level: f64) -> bool {
    let body_bottom = o.min(c);
    l <= level && (body_bottom < level || (body_bottom == level && l < level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_break_requires_body_close_above() {
        // wick touches, body closes above -> break
        assert!(is_valid_high_break(9.0, 10.5, 10.5, 9.0, 10.0));
    }

    #[test]
    fn high_break_exact_touch_no_wick_excursion_is_not_a_break() {
        // body exactly on the level, wick does not exceed it
        assert!(!is_valid_high_break(9.0, 10.0, 10.0, 9.0, 10.0));
    }

    #[test]
    fn high_break_exact_body_with_wick_excursion_is_a_break() {
        // body exactly on the level but wick strictly exceeds it
        assert!(is_valid_high_break(9.0, 10.0, 10.1, 9.0, 10.0));
    }

    #[test]
    fn high_break_wick_short_of_level_is_never_a_break() {
        assert!(!is_valid_high_break(9.0, 9.9, 9.9, 8.0, 10.0));
    }

    #[test]
    fn low_break_requires_body_close_below() {
        assert!(is_valid_low_break(11.0, 9.5, 11.0, 9.5, 10.0));
    }

    #[test]
    fn low_break_exact_touch_no_wick_excursion_is_not_a_break() {
        assert!(!is_valid_low_break(11.0, 10.0, 11.0, 10.0, 10.0));
    }

    #[test]
    fn low_break_exact_body_with_wick_excursion_is_a_break() {
        assert!(is_valid_low_break(11.0, 10.0, 11.0, 9.9, 10.0));
    }
}
