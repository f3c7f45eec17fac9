//! S5 overlay assembler: per-kind level cap, visibility mode filter, and
//! final packaging into the returned [`Overlay`].

use crate::options::VisibilityMode;
use crate::types::{FiniteOrNull, Level, Marker, Overlay};

/// Non-protected levels retain at most this many most-recent entries per
/// kind; protected-high/protected-low levels are uncapped.
const MAX_LEVELS_PER_KIND: usize = 24;

/// Applies the per-kind level cap, then the visibility mode filter, and
/// assembles the final overlay. `close` seeds `series.main` only for the
/// below-minimum-length short-circuit caller (spec.md §7); ordinary callers
/// pass an empty `close` slice here since `main` is always stripped anyway.
pub fn assemble(markers: Vec<Marker>, levels: Vec<Level>, visibility: VisibilityMode) -> Overlay {
    let capped = cap_levels(levels);
    let (markers, levels) = apply_visibility(markers, capped, visibility);
    Overlay {
        series: std::collections::BTreeMap::new(),
        markers,
        levels,
    }
}

/// Builds the degenerate overlay for `N < 3` / empty input: `main` equal to
/// `close`, no markers, no levels.
pub fn short_circuit(close: &[f64]) -> Overlay {
    let mut series = std::collections::BTreeMap::new();
    series.insert("main".to_string(), close.iter().map(|&v| FiniteOrNull(v)).collect());
    Overlay {
        series,
        markers: Vec::new(),
        levels: Vec::new(),
    }
}

fn cap_levels(levels: Vec<Level>) -> Vec<Level> {
    let mut counts: std::collections::HashMap<crate::types::LevelKind, usize> =
        std::collections::HashMap::new();
    let mut kept: Vec<Level> = Vec::with_capacity(levels.len());

    for level in levels.into_iter().rev() {
        if level.kind.is_protected() {
            kept.push(level);
            continue;
        }
        let count = counts.entry(level.kind).or_insert(0);
        if *count >= MAX_LEVELS_PER_KIND {
            continue;
        }
        *count += 1;
        kept.push(level);
    }

    kept.reverse();
    kept
}

fn apply_visibility(
    markers: Vec<Marker>,
    levels: Vec<Level>,
    visibility: VisibilityMode,
) -> (Vec<Marker>, Vec<Level>) {
    match visibility {
        VisibilityMode::All => (markers, levels),
        VisibilityMode::ProtectedOnly => (
            markers.into_iter().filter(|m| m.kind.is_protected()).collect(),
            levels.into_iter().filter(|l| l.kind.is_protected()).collect(),
        ),
        VisibilityMode::LevelsOnly => (Vec::new(), levels),
        VisibilityMode::MarkersOnly => (markers, Vec::new()),
    }
}
