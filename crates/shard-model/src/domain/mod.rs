mod run_meta;
pub use run_meta::{Platform, RunMeta};

mod claim;
pub use claim::{Batch, BatchedInstancesResponse, ClaimedUnit, InstanceResponse};

mod batch_size;
pub use batch_size::BatchSize;

mod result;
pub use result::{NormalizedResult, RunStatus, SpecResult, TestResult, TestState};

mod summary;
pub use summary::{RunSummary, SpecStats, SpecSummary};

mod output;
pub use output::CapturedOutput;

/// Identifier of a spec file as known to the remote authority (e.g. `cypress/e2e/login.cy.ts`).
pub type SpecId = String;

/// Opaque instance identifier issued by the remote authority for a claimed spec.
pub type InstanceId = String;

/// Duration value in milliseconds.
pub type DurationMs = u64;
