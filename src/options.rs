//! Analysis configuration: the single option surface the core exposes.

use serde::{Deserialize, Serialize};

/// Controls which markers/levels survive the overlay assembler (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisibilityMode {
    #[default]
    All,
    ProtectedOnly,
    LevelsOnly,
    MarkersOnly,
}

/// Options accepted by [`crate::analyze`]. Mirrors the teacher's
/// `EngineConfig`: a small, `Default`-able, `Copy` settings struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalyzeOptions {
    #[serde(default)]
    pub visibility: VisibilityMode,
}

impl AnalyzeOptions {
    pub fn with_visibility(visibility: VisibilityMode) -> Self {
        Self { visibility }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_visibility_is_all() {
        assert_eq!(AnalyzeOptions::default().visibility, VisibilityMode::All);
    }
}
