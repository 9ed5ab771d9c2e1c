use serde::{Deserialize, Serialize};

use crate::{InstanceId, SpecId};

/// A single spec claimed from the remote authority.
///
/// `instance_id` is opaque to the runner and must be echoed back when the
/// results for this spec are uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimedUnit {
    pub spec: SpecId,
    pub instance_id: InstanceId,
}

impl ClaimedUnit {
    pub fn new(spec: impl Into<SpecId>, instance_id: impl Into<InstanceId>) -> Self {
        Self {
            spec: spec.into(),
            instance_id: instance_id.into(),
        }
    }
}

/// Outcome of one claim request.
///
/// The counters are progress information for display only. An empty `units`
/// list means the authority has nothing left for this runner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Batch {
    pub units: Vec<ClaimedUnit>,
    pub claimed_count: u32,
    pub total_count: u32,
}

impl Batch {
    pub fn empty(claimed_count: u32, total_count: u32) -> Self {
        Self {
            units: Vec::new(),
            claimed_count,
            total_count,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Spec identifiers in claim order.
    pub fn specs(&self) -> Vec<SpecId> {
        self.units.iter().map(|u| u.spec.clone()).collect()
    }

    /// Spec identifiers joined in claim order, the form the engine accepts for a multi-spec run.
    pub fn joined_specs(&self) -> String {
        self.units
            .iter()
            .map(|u| u.spec.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Response of the single-spec claim endpoint.
///
/// `spec` and `instance_id` are both `null` once the run has no unclaimed specs left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceResponse {
    pub spec: Option<SpecId>,
    pub instance_id: Option<InstanceId>,
    #[serde(default)]
    pub claimed_instances: u32,
    #[serde(default)]
    pub total_instances: u32,
}

impl InstanceResponse {
    pub fn into_batch(self) -> Batch {
        let mut batch = Batch::empty(self.claimed_instances, self.total_instances);
        if let (Some(spec), Some(instance_id)) = (self.spec, self.instance_id) {
            batch.units.push(ClaimedUnit { spec, instance_id });
        }
        batch
    }
}

/// Response of the batched claim endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchedInstancesResponse {
    #[serde(default)]
    pub specs: Vec<ClaimedUnit>,
    #[serde(default)]
    pub claimed_instances: u32,
    #[serde(default)]
    pub total_instances: u32,
}

impl BatchedInstancesResponse {
    pub fn into_batch(self) -> Batch {
        Batch {
            units: self.specs,
            claimed_count: self.claimed_instances,
            total_count: self.total_instances,
        }
    }
}
