use shard_model::RunSummary;
use tracing::{debug, instrument};

use crate::{
    engine::{Engine, Normalizer},
    error::CoreError,
    orchestrator::BatchOrchestrator,
    upload::PendingUploads,
};

/// Claim and execute batches until the authority has nothing left, then wait
/// for every background upload before returning the accumulated summary.
///
/// There is no iteration cap and no timeout: the loop ends only when a claim
/// comes back empty, or when a claim fails. A claim failure still waits for
/// uploads already in flight before the error is returned.
#[instrument(level = "debug", skip_all, fields(run_id = %orchestrator.claimer().meta().run_id))]
pub async fn run_till_done<E, N>(
    orchestrator: &mut BatchOrchestrator<E, N>,
) -> Result<RunSummary, CoreError>
where
    E: Engine,
    N: Normalizer<E::Raw>,
{
    let mut summary = RunSummary::new();
    let mut pending = PendingUploads::new();

    loop {
        let records = match orchestrator.next_batch().await {
            Ok(records) => records,
            Err(e) => {
                debug!(target: "shard.core.run", uploads = pending.len(), "claim failed; draining uploads");
                pending.settle_all().await;
                return Err(e);
            }
        };
        if records.is_empty() {
            debug!(target: "shard.core.run", uploads = pending.len(), "no more specs to run");
            break;
        }
        for record in records {
            if let Some(spec_summary) = record.summary.spec_summary {
                summary.insert(record.summary.spec, spec_summary);
            }
            pending.push(record.upload);
        }
    }

    let report = pending.settle_all().await;
    debug!(
        target: "shard.core.run",
        completed = report.completed,
        aborted = report.aborted,
        specs = summary.len(),
        "all uploads settled"
    );
    Ok(summary)
}
