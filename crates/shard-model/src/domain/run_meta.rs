use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Host platform reported to the remote authority alongside every claim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    /// OS family (`linux`, `macos`, `windows`).
    pub os_name: String,
    /// Distribution or release string, best effort.
    pub os_version: String,
    /// CPU architecture.
    pub arch: String,
}

/// Identifies this runner to the remote authority.
///
/// Created once before the run loop starts and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMeta {
    pub run_id: String,
    pub group_id: String,
    pub machine_id: String,
    pub platform: Platform,
}

impl RunMeta {
    pub fn new(
        run_id: impl Into<String>,
        group_id: impl Into<String>,
        machine_id: impl Into<String>,
        platform: Platform,
    ) -> Result<Self, ModelError> {
        let meta = Self {
            run_id: run_id.into(),
            group_id: group_id.into(),
            machine_id: machine_id.into(),
            platform,
        };
        if meta.run_id.trim().is_empty() {
            return Err(ModelError::Empty("run id"));
        }
        if meta.machine_id.trim().is_empty() {
            return Err(ModelError::Empty("machine id"));
        }
        Ok(meta)
    }
}
