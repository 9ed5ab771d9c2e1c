use std::sync::Arc;

use shard_model::{Batch, SpecId, SpecSummary};
use tracing::{debug, info, instrument, warn};

use crate::{
    capture::CaptureBuffer,
    claim::WorkClaimer,
    config::RunConfig,
    engine::{Engine, Normalizer, RunRequest},
    error::CoreError,
    upload::{UploadHandle, UploadJob, Uploader, dispatch},
};

/// Summary half of a [`UnitRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct UnitSummary {
    pub spec: SpecId,
    /// `None` when the normalized result had no entry for this spec.
    pub spec_summary: Option<SpecSummary>,
}

/// What one claimed spec produced in a batch.
#[derive(Debug)]
pub struct UnitRecord {
    pub summary: UnitSummary,
    pub upload: UploadHandle,
}

/// Claims one batch, runs it, normalizes the result and starts the uploads.
pub struct BatchOrchestrator<E, N> {
    claimer: WorkClaimer,
    engine: E,
    normalizer: N,
    uploader: Arc<dyn Uploader>,
    capture: CaptureBuffer,
    config: RunConfig,
}

impl<E, N> BatchOrchestrator<E, N>
where
    E: Engine,
    N: Normalizer<E::Raw>,
{
    pub fn new(
        claimer: WorkClaimer,
        engine: E,
        normalizer: N,
        uploader: Arc<dyn Uploader>,
        capture: CaptureBuffer,
        config: RunConfig,
    ) -> Self {
        Self {
            claimer,
            engine,
            normalizer,
            uploader,
            capture,
            config,
        }
    }

    pub fn claimer(&self) -> &WorkClaimer {
        &self.claimer
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Claim a fresh batch and execute it. An empty result means no work is left.
    pub async fn next_batch(&mut self) -> Result<Vec<UnitRecord>, CoreError> {
        let batch = self.claimer.claim().await?;
        Ok(self.execute(batch).await)
    }

    /// Execute an already claimed batch.
    ///
    /// Returns one record per unit in claim order. The uploads are running
    /// when this returns; nothing here waits for them.
    #[instrument(level = "debug", skip_all, fields(engine = self.engine.name(), units = batch.len()))]
    pub async fn execute(&mut self, batch: Batch) -> Vec<UnitRecord> {
        if batch.is_empty() {
            return Vec::new();
        }

        // Held until the output snapshot is taken.
        let flight = self.capture.single_flight().await;

        let joined = batch.joined_specs();
        info!(
            target: "shard.core.batch",
            specs = %joined,
            progress = %format!("{}/{}", batch.claimed_count, batch.total_count),
            "running specs"
        );

        let raw = self
            .engine
            .run_safe(RunRequest {
                specs: &joined,
                params: &self.config.params,
            })
            .await;
        let requested = batch.specs();
        let result = Arc::new(self.normalizer.normalize(raw, &requested, &self.config));

        info!(target: "shard.core.batch", "reporting results and artifacts in background");

        let output = Arc::new(self.capture.take());
        drop(flight);
        debug!(target: "shard.core.batch", output_bytes = output.len(), "captured output");

        batch
            .units
            .into_iter()
            .map(|unit| {
                let spec_summary = result.summary_for(&unit.spec);
                if spec_summary.is_none() {
                    warn!(target: "shard.core.batch", spec = %unit.spec, "cannot find run result for spec");
                }
                let summary = UnitSummary {
                    spec: unit.spec.clone(),
                    spec_summary,
                };
                let upload = dispatch(
                    Arc::clone(&self.uploader),
                    UploadJob {
                        unit,
                        result: Arc::clone(&result),
                        output: Arc::clone(&output),
                    },
                );
                UnitRecord { summary, upload }
            })
            .collect()
    }
}
