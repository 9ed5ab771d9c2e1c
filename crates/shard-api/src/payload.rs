use serde::{Deserialize, Serialize};
use shard_model::{BatchSize, Platform, RunMeta, SpecStats, TestResult};

/// Body of the single-spec claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstancePayload {
    pub group_id: String,
    pub machine_id: String,
    pub platform: Platform,
}

impl From<&RunMeta> for CreateInstancePayload {
    fn from(meta: &RunMeta) -> Self {
        Self {
            group_id: meta.group_id.clone(),
            machine_id: meta.machine_id.clone(),
            platform: meta.platform.clone(),
        }
    }
}

/// Body of the batched claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchedInstancesPayload {
    #[serde(flatten)]
    pub instance: CreateInstancePayload,
    pub batch_size: BatchSize,
}

/// Results of one spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPayload {
    pub spec: String,
    pub stats: SpecStats,
    #[serde(default)]
    pub tests: Vec<TestResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Captured engine output for one spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputPayload {
    pub output: String,
}
