pub mod capture;
pub use capture::CaptureBuffer;

pub mod claim;
pub use claim::{ClaimApi, ClaimStrategy, WorkClaimer};

pub mod config;
pub use config::{RunConfig, RunParams};

pub mod engine;
pub use engine::{Engine, Normalizer, RunRequest};

pub mod error;
pub use error::{ClaimError, CoreError, UploadError};

pub mod orchestrator;
pub use orchestrator::{BatchOrchestrator, UnitRecord, UnitSummary};

pub mod run;
pub use run::run_till_done;

pub mod system;
pub use system::{machine_id, os_info, platform};

pub mod upload;
pub use upload::{PendingUploads, SettleReport, UploadHandle, UploadJob, Uploader, dispatch};
