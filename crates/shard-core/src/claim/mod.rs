//! Claiming specs from the remote authority.
use std::sync::Arc;

use async_trait::async_trait;
use shard_model::{Batch, BatchSize, BatchedInstancesResponse, InstanceResponse, RunMeta};
use tracing::{debug, instrument, warn};

use crate::error::ClaimError;

/// Remote authority that hands out unclaimed specs.
///
/// Implementations own transport concerns (including any retry policy);
/// errors returned here abort the run.
#[async_trait]
pub trait ClaimApi: Send + Sync {
    /// Claim exactly one spec.
    async fn create_instance(&self, meta: &RunMeta) -> Result<InstanceResponse, ClaimError>;

    /// Claim up to `batch_size` specs in one call.
    async fn create_batched_instances(
        &self,
        meta: &RunMeta,
        batch_size: BatchSize,
    ) -> Result<BatchedInstancesResponse, ClaimError>;
}

/// How specs are claimed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStrategy {
    /// One spec per claim call (legacy orchestration).
    Single,
    /// Up to `batch_size` specs per claim call.
    Batched { batch_size: BatchSize },
}

impl ClaimStrategy {
    /// Set by the remote authority's managed runner images.
    pub const MANAGED_ENV: &'static str = "SHARD_MANAGED_RUNNER";
    /// Forces batched orchestration outside the managed environment.
    pub const BATCHED_OVERRIDE_ENV: &'static str = "SHARD_BATCHED_ORCHESTRATION";

    /// Batched when running in the managed environment or when explicitly overridden.
    pub fn select(managed: bool, batched_override: bool, batch_size: BatchSize) -> Self {
        if managed || batched_override {
            ClaimStrategy::Batched { batch_size }
        } else {
            ClaimStrategy::Single
        }
    }

    /// Inspect the process environment once and pick a strategy.
    pub fn detect(batch_size: BatchSize) -> Self {
        Self::select(
            env_flag(Self::MANAGED_ENV),
            env_flag(Self::BATCHED_OVERRIDE_ENV),
            batch_size,
        )
    }

    pub fn is_batched(&self) -> bool {
        matches!(self, ClaimStrategy::Batched { .. })
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var_os(name).is_some_and(|v| !v.is_empty())
}

/// Claims batches for one run with a fixed strategy.
pub struct WorkClaimer {
    api: Arc<dyn ClaimApi>,
    meta: RunMeta,
    strategy: ClaimStrategy,
}

impl WorkClaimer {
    pub fn new(api: Arc<dyn ClaimApi>, meta: RunMeta, strategy: ClaimStrategy) -> Self {
        Self {
            api,
            meta,
            strategy,
        }
    }

    pub fn meta(&self) -> &RunMeta {
        &self.meta
    }

    pub fn strategy(&self) -> ClaimStrategy {
        self.strategy
    }

    /// Claim the next batch. An empty batch means there is no work left.
    #[instrument(level = "debug", skip(self), fields(run_id = %self.meta.run_id))]
    pub async fn claim(&self) -> Result<Batch, ClaimError> {
        match self.strategy {
            ClaimStrategy::Single => {
                let resp = self.api.create_instance(&self.meta).await?;
                Ok(resp.into_batch())
            }
            ClaimStrategy::Batched { batch_size } => {
                debug!(target: "shard.core.claim", %batch_size, "claiming batched specs");
                let resp = self
                    .api
                    .create_batched_instances(&self.meta, batch_size)
                    .await?;
                let mut batch = resp.into_batch();
                if batch.len() > batch_size.get() {
                    let extra: Vec<_> = batch
                        .units
                        .drain(batch_size.get()..)
                        .map(|u| u.spec)
                        .collect();
                    warn!(
                        target: "shard.core.claim",
                        %batch_size,
                        ?extra,
                        "authority granted more specs than requested; ignoring the surplus"
                    );
                }
                Ok(batch)
            }
        }
    }
}
