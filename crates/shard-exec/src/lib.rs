mod error;
pub use error::{ExecError, ExecResult};

mod raw;
pub use raw::{EngineReport, EngineRun, EngineSpec, EngineStats, EngineTest, RawResult};

pub mod results;
pub use results::EngineNormalizer;

#[cfg(feature = "proc")]
mod util;

#[cfg(feature = "proc")]
pub mod proc;
#[cfg(feature = "proc")]
pub use proc::{EngineConfig, ProcEngine};

pub mod prelude {
    pub use crate::EngineNormalizer;
    pub use crate::RawResult;
    pub use crate::error::{ExecError, ExecResult};
    #[cfg(feature = "proc")]
    pub use crate::{EngineConfig, ProcEngine};
}
