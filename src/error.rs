//! Error types for the market structure analyzer.
//!
//! Mirrors the teacher's `PatternError`: a small `thiserror::Error` enum,
//! no panics on well-formed input, defensive skip-not-abort internally.

pub type Result<T> = std::result::Result<T, AnalyzeError>;

/// Errors that can occur while analyzing market structure.
///
/// Well-formed OHLC of any length never produces one of these; `N < 3` and
/// empty arrays are handled as a normal (structure-free) return, not a
/// failure. The only way `analyze` fails is mismatched input shape.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalyzeError {
    #[error("OHLC arrays have mismatched lengths: open={open}, high={high}, low={low}, close={close}")]
    InputShape {
        open: usize,
        high: usize,
        low: usize,
        close: usize,
    },
}

/// Phase of the runner wire contract (spec.md §6) in which a failure
/// occurred. Drives the `error.phase` field of the failure envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerPhase {
    Bootstrap,
    Inputs,
    Import,
    Execute,
    Serialize,
}

/// Errors the `indicator-runner` binary can report, one variant per
/// spec.md §6 `type` taxonomy entry. `Import` / `MissingEntryPoint` have no
/// way to occur in this crate (there is no dynamic script loading — the
/// binary only ever runs the one built-in analyzer) but are kept so the
/// wire `type` enum stays complete and round-trips for callers that match
/// on it exhaustively.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RunnerError {
    #[error("usage error: {0}")]
    Usage(String),
    #[error("input error: {0}")]
    Input(String),
    #[error("import error: {0}")]
    Import(String),
    #[error("missing entry point: {0}")]
    MissingEntryPoint(String),
    #[error("execution error: {0}")]
    Execution(String),
    #[error("result error: {0}")]
    Result(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl RunnerError {
    /// The wire `error.type` string (spec.md §6 taxonomy).
    pub fn wire_type(&self) -> &'static str {
        match self {
            RunnerError::Usage(_) => "UsageError",
            RunnerError::Input(_) => "InputError",
            RunnerError::Import(_) => "ImportError",
            RunnerError::MissingEntryPoint(_) => "MissingEntryPoint",
            RunnerError::Execution(_) => "ExecutionError",
            RunnerError::Result(_) => "ResultError",
            RunnerError::Serialization(_) => "SerializationError",
        }
    }

    /// The phase this kind of error is always reported in.
    pub fn phase(&self) -> RunnerPhase {
        match self {
            RunnerError::Usage(_) => RunnerPhase::Bootstrap,
            RunnerError::Input(_) => RunnerPhase::Inputs,
            RunnerError::Import(_) | RunnerError::MissingEntryPoint(_) => RunnerPhase::Import,
            RunnerError::Execution(_) => RunnerPhase::Execute,
            RunnerError::Result(_) | RunnerError::Serialization(_) => RunnerPhase::Serialize,
        }
    }
}
