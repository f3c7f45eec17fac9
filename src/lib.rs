//! # market-structure
//!
//! Market Structure analyzer: a pure function over aligned OHLC bar arrays
//! that detects swing highs/lows, filters them into an external structure,
//! finds break-of-structure (BOS) events, derives the prevailing trend,
//! tracks Protected High/Low with sweep refinement, and emits continuation
//! (MSC) and shift (MSS) events as a marker/level overlay.
//!
//! ## Quick Start
//!
//! ```rust
//! use market_structure::prelude::*;
//!
//! let ohlc = OhlcSeries::new(
//!     vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0],
//!     vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0],
//!     vec![1.0, 2.0, 2.0, 1.0, 2.0, 2.0],
//!     vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0],
//! ).unwrap();
//!
//! let overlay = analyze(&ohlc, &AnalyzeOptions::default());
//! assert!(overlay.markers.iter().any(|m| m.kind == MarkerKind::ProtectedLow));
//! ```

pub mod bos;
pub mod breaks;
pub mod error;
pub mod external;
pub mod options;
pub mod overlay;
pub mod structure;
pub mod swings;
pub mod types;

pub mod prelude {
    pub use crate::{
        analyze, analyze_parallel,
        error::{AnalyzeError, Result},
        options::{AnalyzeOptions, VisibilityMode},
        types::{
            DebugInfo, Level, LevelKind, Marker, MarkerKind, Overlay, Swing, SwingKind, Trend,
        },
        AnalyzeFailure, AnalyzeResult, OhlcSeries,
    };
}

use error::AnalyzeError;
use options::AnalyzeOptions;
use types::Overlay;

/// Four parallel, equal-length OHLC bar sequences. The sole input shape
/// [`analyze`] accepts — mirrors the teacher's `OHLCV` bar trait, but as a
/// typed columnar view rather than a per-bar object, since spec.md §3
/// describes the domain as "four parallel sequences," not a `Vec<Bar>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OhlcSeries {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl OhlcSeries {
    /// Builds a series, validating that all four arrays share one length.
    /// `N < 3` or empty arrays are accepted here (spec.md §7): the shape
    /// check only rejects *mismatched* lengths, not short ones.
    pub fn new(
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    ) -> error::Result<Self> {
        let n = open.len();
        if high.len() != n || low.len() != n || close.len() != n {
            return Err(AnalyzeError::InputShape {
                open: n,
                high: high.len(),
                low: low.len(),
                close: close.len(),
            });
        }
        Ok(Self {
            open,
            high,
            low,
            close,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.close.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

/// Runs the full five-stage pipeline over one series and returns the
/// resulting overlay. A pure function of its inputs: no shared state, no
/// suspension points, `O(N)`/`O(S)` memory (spec.md §5).
pub fn analyze(ohlc: &OhlcSeries, options: &AnalyzeOptions) -> Overlay {
    let n = ohlc.len();
    if n < 3 {
        return overlay::short_circuit(&ohlc.close);
    }

    let swings = swings::detect_swings(&ohlc.high, &ohlc.low);
    let external = external::extract_external_structure(&swings);
    let scan = bos::scan_breaks(&ohlc.open, &ohlc.high, &ohlc.low, &ohlc.close, &external);
    let enrichment = structure::enrich(
        &external,
        &scan.break_map,
        &ohlc.open,
        &ohlc.high,
        &ohlc.low,
        &ohlc.close,
    );

    tracing::debug!(
        bars = n,
        swings = external.len(),
        trend = ?enrichment.trend,
        "analyzed market structure"
    );

    let mut markers = scan.markers;
    markers.extend(enrichment.markers);

    overlay::assemble(markers, enrichment.levels, options.visibility)
}

/// One instrument's result from [`analyze_parallel`].
#[derive(Debug, Clone)]
pub struct AnalyzeResult {
    pub symbol: String,
    pub overlay: Overlay,
}

/// One instrument's failure from [`analyze_parallel`] (mismatched OHLC
/// shape; `analyze` itself never fails on well-formed input).
#[derive(Debug, Clone)]
pub struct AnalyzeFailure {
    pub symbol: String,
    pub error: AnalyzeError,
}

/// Analyzes many independent instruments concurrently with `rayon`.
/// "Concurrent calls on disjoint inputs are trivially safe; no locks
/// required" (spec.md §5) is exactly the case the teacher's `scan_parallel`
/// was built for; this mirrors its success/failure split rather than a
/// single `Result`-per-item `Vec`.
pub fn analyze_parallel<'a, I>(instruments: I, options: &AnalyzeOptions) -> (Vec<AnalyzeResult>, Vec<AnalyzeFailure>)
where
    I: rayon::iter::IntoParallelIterator<Item = (&'a str, &'a [f64], &'a [f64], &'a [f64], &'a [f64])>,
{
    use rayon::prelude::*;

    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, open, high, low, close)| {
            OhlcSeries::new(open.to_vec(), high.to_vec(), low.to_vec(), close.to_vec())
                .map(|series| AnalyzeResult {
                    symbol: symbol.to_string(),
                    overlay: analyze(&series, options),
                })
                .map_err(|error| AnalyzeFailure {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => failures.push(e),
        }
    }
    (successes, failures)
}
