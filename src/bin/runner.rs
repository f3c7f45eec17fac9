//! `indicator-runner`: the wire-contract binary for the surrounding
//! indicator-runner collaborator (spec.md §6). Reads one JSON request from
//! stdin, calls [`market_structure::analyze`], and writes exactly one JSON
//! response to stdout. Module loading, subprocess management, and Python
//! traceback translation belong to the real collaborator and are out of
//! scope (spec.md §1) — only the request/response envelope is exercised
//! here.

use std::io::{self, Read, Write};
use std::time::Instant;

use market_structure::error::RunnerError;
use market_structure::options::{AnalyzeOptions, VisibilityMode};
use market_structure::{analyze, OhlcSeries};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// Not a real loaded script (this crate has no dynamic script loading); a
/// stable placeholder so `meta.scriptPath` round-trips the documented shape.
const SCRIPT_PATH: &str = "<builtin:market-structure>";

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let total_start = Instant::now();
    let response = run(total_start);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    // A `serde_json::to_string` failure here means `response` itself could
    // not be serialized, which should never happen for our own envelope
    // types; fall back to a minimal hand-built error object rather than
    // panicking, so the process always emits exactly one JSON object.
    let text = serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(
            r#"{{"ok":false,"apiVersion":1,"error":{{"type":"SerializationError","message":{:?},"phase":"serialize"}}}}"#,
            e.to_string()
        )
    });
    let _ = writeln!(handle, "{text}");
}

fn run(total_start: Instant) -> Value {
    match read_request() {
        Ok(request) => match execute(&request) {
            Ok((series, markers, levels)) => success_envelope(series, markers, levels, total_start),
            Err(e) => failure_envelope(&e),
        },
        Err(e) => failure_envelope(&e),
    }
}

struct Request {
    ohlc: OhlcSeries,
    options: AnalyzeOptions,
}

fn read_request() -> Result<Request, RunnerError> {
    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .map_err(|e| RunnerError::Usage(format!("failed to read stdin: {e}")))?;

    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| RunnerError::Input(format!("stdin is not valid JSON: {e}")))?;

    // Accept either a nested `{inputs: {...}}` envelope or flat OHLC keys at
    // the top level (spec.md §6).
    let inputs = value.get("inputs").unwrap_or(&value);

    let open = extract_series(inputs, "open")?;
    let high = extract_series(inputs, "high")?;
    let low = extract_series(inputs, "low")?;
    let close = extract_series(inputs, "close")?;

    let ohlc = OhlcSeries::new(open, high, low, close)
        .map_err(|e| RunnerError::Input(e.to_string()))?;

    let visibility = value
        .get("settings")
        .and_then(|s| s.get("visibilityMode"))
        .and_then(Value::as_str)
        .map(parse_visibility)
        .transpose()?
        .unwrap_or_default();

    Ok(Request {
        ohlc,
        options: AnalyzeOptions::with_visibility(visibility),
    })
}

fn extract_series(inputs: &Value, key: &str) -> Result<Vec<f64>, RunnerError> {
    let arr = inputs
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| RunnerError::Input(format!("missing or non-array `{key}`")))?;

    arr.iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_f64()
                .ok_or_else(|| RunnerError::Input(format!("`{key}[{i}]` is not a number")))
        })
        .collect()
}

fn parse_visibility(raw: &str) -> Result<VisibilityMode, RunnerError> {
    match raw {
        "all" => Ok(VisibilityMode::All),
        "protected-only" => Ok(VisibilityMode::ProtectedOnly),
        "levels-only" => Ok(VisibilityMode::LevelsOnly),
        "markers-only" => Ok(VisibilityMode::MarkersOnly),
        other => Err(RunnerError::Input(format!(
            "unknown settings.visibilityMode: {other:?}"
        ))),
    }
}

/// Runs the core and returns its three output facets already turned into
/// the wire shapes the success envelope wants, so `run` doesn't need to
/// know about `Overlay`'s internal field names.
///
/// `analyze` itself never fails on well-formed input (spec.md §7); the only
/// failures possible past this point are the `result`/`serialize` phases
/// below, reserved for a collaborator where the loaded script can throw
/// mid-execution.
fn execute(request: &Request) -> Result<(Value, Value, Value), RunnerError> {
    let overlay = analyze(&request.ohlc, &request.options);

    let series = serde_json::to_value(&overlay.series)
        .map_err(|e| RunnerError::Result(format!("series did not serialize: {e}")))?;
    let markers = serde_json::to_value(&overlay.markers)
        .map_err(|e| RunnerError::Result(format!("markers did not serialize: {e}")))?;
    let levels = serde_json::to_value(&overlay.levels)
        .map_err(|e| RunnerError::Result(format!("levels did not serialize: {e}")))?;

    Ok((series, markers, levels))
}

fn success_envelope(series: Value, markers: Value, levels: Value, total_start: Instant) -> Value {
    let markers_count = markers.as_array().map_or(0, Vec::len);
    let first_marker = markers.as_array().and_then(|m| m.first().cloned());

    json!({
        "ok": true,
        "apiVersion": 1,
        "series": series,
        "markers": markers,
        "levels": levels,
        "debug_info": {
            "markers_count": markers_count,
            "first_marker": first_marker,
        },
        "meta": {
            "scriptPath": SCRIPT_PATH,
            "executionMs": total_start.elapsed().as_secs_f64() * 1000.0,
            "totalMs": total_start.elapsed().as_secs_f64() * 1000.0,
        },
    })
}

fn failure_envelope(error: &RunnerError) -> Value {
    tracing::error!(phase = ?error.phase(), %error, "indicator-runner failed");
    json!({
        "ok": false,
        "apiVersion": 1,
        "error": {
            "type": error.wire_type(),
            "message": error.to_string(),
            "phase": error.phase(),
        },
    })
}
