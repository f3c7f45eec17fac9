//! Domain types: swings, break events, markers, levels, overlay.
//!
//! Dynamic dict-of-variants shapes in the source indicator become closed
//! enums here (spec.md §9 "Dynamic record shapes"), following the teacher's
//! habit of validated/typed wrappers (`Ratio`, `Period`) over bare primitives.

use serde::{Serialize, Serializer};

/// Kind of a swing point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwingKind {
    SwingHigh,
    SwingLow,
}

/// A local extremum produced by the swing detector (S1), possibly replaced
/// in place by the external filter (S2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swing {
    pub index: usize,
    pub kind: SwingKind,
    pub price: f64,
}

impl Swing {
    #[inline]
    pub fn is_high(&self) -> bool {
        matches!(self.kind, SwingKind::SwingHigh)
    }

    #[inline]
    pub fn is_low(&self) -> bool {
        matches!(self.kind, SwingKind::SwingLow)
    }
}

/// Anchor of an impulse leg: the opposite-kind swing a break event is
/// measured from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub index: usize,
    pub price: f64,
}

/// A recorded break of an external swing, with its impulse-origin anchor.
///
/// `swing_was_promoted` is true when the swing that produced this break was,
/// at the moment of the scan, newly promoted to HSH (for a bullish event) or
/// LSL (for a bearish event) — used to prefer "structural" events over
/// ordinary ones when deriving the Protected High/Low.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakEvent {
    pub swing_index: usize,
    pub swing_price: f64,
    pub break_index: usize,
    pub origin: Anchor,
    pub swing_was_promoted: bool,
}

/// A Protected High or Protected Low: the impulse-origin swing underpinning
/// the current trend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtectedLevel {
    pub index: usize,
    pub price: f64,
}

/// The prevailing trend derived from the most recent structural break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    None,
}

/// Discriminant for a [`Marker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerKind {
    SwingHigh,
    SwingLow,
    BosBullish,
    BosBearish,
    Hsh,
    Lsl,
    ProtectedHigh,
    ProtectedLow,
    MscBullish,
    MscBearish,
    MssBullish,
    MssBearish,
}

impl MarkerKind {
    /// True for any kind whose wire name contains "protected" (visibility
    /// mode `protected-only`, spec.md §4.5 / §8 invariant 8).
    #[inline]
    pub fn is_protected(self) -> bool {
        matches!(self, MarkerKind::ProtectedHigh | MarkerKind::ProtectedLow)
    }
}

/// A point annotation at a bar index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub index: usize,
    pub kind: MarkerKind,
    pub value: f64,
}

/// Discriminant for a [`Level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LevelKind {
    HshLevel,
    LslLevel,
    ProtectedHigh,
    ProtectedLow,
    HshSweep,
    LslSweep,
    MscLeg,
}

impl LevelKind {
    #[inline]
    pub fn is_protected(self) -> bool {
        matches!(self, LevelKind::ProtectedHigh | LevelKind::ProtectedLow)
    }
}

/// A horizontal price segment spanning `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Level {
    pub from: usize,
    pub to: usize,
    pub price: f64,
    pub kind: LevelKind,
}

/// A value that serializes as JSON `null` when non-finite, otherwise as the
/// plain number — mirrors the teacher's hand-rolled `Serialize` for `Ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiniteOrNull(pub f64);

impl Serialize for FiniteOrNull {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            s.serialize_f64(self.0)
        } else {
            s.serialize_none()
        }
    }
}

/// The output overlay: series, markers, and levels for one `analyze` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overlay {
    pub series: std::collections::BTreeMap<String, Vec<FiniteOrNull>>,
    pub markers: Vec<Marker>,
    pub levels: Vec<Level>,
}

/// Debug counters derived from a finished overlay (spec.md §6 `debug_info`).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DebugInfo {
    pub markers_count: usize,
    pub first_marker: Option<Marker>,
}

impl Overlay {
    /// Computes `debug_info` from the final (visibility-filtered) overlay,
    /// so invariant 6 (`markers_count == len(markers)`) holds by
    /// construction rather than by keeping two counters in sync.
    pub fn debug_info(&self) -> DebugInfo {
        DebugInfo {
            markers_count: self.markers.len(),
            first_marker: self.markers.first().copied(),
        }
    }
}
