use serde::{Deserialize, Serialize};

use crate::{DurationMs, SpecId, SpecStats, SpecSummary};

/// Overall outcome of one engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    /// The engine ran to completion (individual tests may still have failed).
    Finished,
    /// The engine could not run at all (crash, spawn failure, unreadable result).
    Failed,
}

/// Final state of a single test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestState {
    Passed,
    Failed,
    Pending,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Title path, outermost suite first.
    pub title: Vec<String>,
    pub state: TestState,
    #[serde(default)]
    pub duration_ms: DurationMs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Canonical result of one spec within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecResult {
    pub spec: SpecId,
    pub stats: SpecStats,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<TestResult>,
    /// Set when the spec could not be executed at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SpecResult {
    pub fn summary(&self) -> SpecSummary {
        SpecSummary {
            stats: self.stats,
            error: self.error.clone(),
        }
    }
}

/// Engine result normalized against the specs that were requested.
///
/// Produced once per batch and read-only afterwards; uploads share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub status: RunStatus,
    #[serde(default)]
    pub total_duration_ms: DurationMs,
    pub runs: Vec<SpecResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalizedResult {
    /// Look up the result recorded for `spec`.
    pub fn spec(&self, spec: &str) -> Option<&SpecResult> {
        self.runs.iter().find(|r| r.spec == spec)
    }

    /// Per-spec summary, `None` when the engine produced nothing for `spec`.
    pub fn summary_for(&self, spec: &str) -> Option<SpecSummary> {
        self.spec(spec).map(SpecResult::summary)
    }
}
