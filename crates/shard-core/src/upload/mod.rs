//! Fire-and-forget result uploads.
//!
//! [`dispatch`] starts an upload immediately and returns a handle that always
//! settles cleanly: upload errors are logged inside the task and never reach
//! whoever awaits the handle. [`PendingUploads`] collects the handles so the
//! run loop can wait for all of them once no work is left.
use std::sync::Arc;

use async_trait::async_trait;
use shard_model::{CapturedOutput, ClaimedUnit, NormalizedResult, SpecId};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::UploadError;

/// Everything needed to report one claimed spec.
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub unit: ClaimedUnit,
    /// Whole batch result; the uploader picks this unit's entry.
    pub result: Arc<NormalizedResult>,
    /// Output captured while the batch ran.
    pub output: Arc<CapturedOutput>,
}

/// Ships one spec's result and output to the remote authority.
#[async_trait]
pub trait Uploader: Send + Sync + 'static {
    async fn upload(&self, job: &UploadJob) -> Result<(), UploadError>;
}

/// Handle to an upload started by [`dispatch`].
#[derive(Debug)]
pub struct UploadHandle {
    spec: SpecId,
    handle: JoinHandle<()>,
}

impl UploadHandle {
    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the upload. Returns `false` if the task panicked or was aborted.
    pub async fn settle(self) -> bool {
        match self.handle.await {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "shard.core.upload", spec = %self.spec, error = %e, "upload task did not complete");
                false
            }
        }
    }
}

/// Start uploading `job` in the background.
///
/// Must be called from within a tokio runtime.
pub fn dispatch(uploader: Arc<dyn Uploader>, job: UploadJob) -> UploadHandle {
    let spec = job.unit.spec.clone();
    let handle = tokio::spawn(async move {
        match uploader.upload(&job).await {
            Ok(()) => debug!(
                target: "shard.core.upload",
                spec = %job.unit.spec,
                instance_id = %job.unit.instance_id,
                "results uploaded"
            ),
            Err(e) => error!(
                target: "shard.core.upload",
                spec = %job.unit.spec,
                instance_id = %job.unit.instance_id,
                error = %e,
                "failed to upload results"
            ),
        }
    });
    UploadHandle { spec, handle }
}

/// Outcome of draining [`PendingUploads`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettleReport {
    /// Tasks that ran to completion (including ones whose upload failed and was logged).
    pub completed: usize,
    /// Tasks that panicked or were aborted.
    pub aborted: usize,
}

impl SettleReport {
    pub fn total(&self) -> usize {
        self.completed + self.aborted
    }
}

/// Uploads started during a run and not yet awaited.
#[derive(Debug, Default)]
pub struct PendingUploads {
    handles: Vec<UploadHandle>,
}

impl PendingUploads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: UploadHandle) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every pending upload, ignoring individual failures.
    pub async fn settle_all(self) -> SettleReport {
        let mut report = SettleReport::default();
        for handle in self.handles {
            if handle.settle().await {
                report.completed += 1;
            } else {
                report.aborted += 1;
            }
        }
        report
    }
}
