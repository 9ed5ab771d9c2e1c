//! Seams to the test-execution engine and to result normalization.
use async_trait::async_trait;
use shard_model::{NormalizedResult, SpecId};

use crate::config::{RunConfig, RunParams};

/// One engine invocation.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest<'a> {
    /// Spec identifiers joined with `,` in claim order.
    pub specs: &'a str,
    pub params: &'a RunParams,
}

/// Runs specs through the underlying test engine.
///
/// `run_safe` has no error channel: an engine that crashes, fails to start or
/// produces garbage must be reported through `Self::Raw`.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Engine-specific result, only ever read by a matching [`Normalizer`].
    type Raw: Send;

    fn name(&self) -> &'static str;

    async fn run_safe(&self, request: RunRequest<'_>) -> Self::Raw;
}

/// Turns a raw engine result into the canonical per-spec structure.
pub trait Normalizer<R>: Send + Sync {
    fn normalize(&self, raw: R, requested: &[SpecId], config: &RunConfig) -> NormalizedResult;
}
