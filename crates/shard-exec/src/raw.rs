use serde::{Deserialize, Serialize};

/// Result of one engine invocation, as seen by the adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    /// The engine ran and wrote a report.
    Completed(EngineReport),
    /// The engine could not produce a report; `message` says why.
    Failed { message: String },
}

impl RawResult {
    pub fn failed(message: impl Into<String>) -> Self {
        RawResult::Failed {
            message: message.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RawResult::Failed { .. })
    }
}

/// Report file written by the engine after a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineReport {
    #[serde(default)]
    pub total_duration: u64,
    #[serde(default)]
    pub runs: Vec<EngineRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRun {
    pub spec: EngineSpec,
    #[serde(default)]
    pub stats: EngineStats,
    #[serde(default)]
    pub tests: Vec<EngineTest>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSpec {
    pub relative: String,
    #[serde(default)]
    pub absolute: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineStats {
    pub tests: u32,
    pub passes: u32,
    pub failures: u32,
    pub pending: u32,
    pub skipped: u32,
    /// Milliseconds.
    pub duration: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineTest {
    pub title: Vec<String>,
    pub state: String,
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub display_error: Option<String>,
}
