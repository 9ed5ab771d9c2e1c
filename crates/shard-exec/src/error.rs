use thiserror::Error;

pub type ExecResult<T> = Result<T, ExecError>;

/// Reasons an engine invocation produced no usable result.
///
/// Never returned from [`shard_core::Engine::run_safe`]; the adapter folds
/// these into [`crate::RawResult::Failed`].
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("non-zero exit code: {code}")]
    NonZeroExit { code: i32 },
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("killed by signal")]
    KilledBySignal,
    #[error("missing program")]
    MissingProgram,
    #[error("invalid engine result: {0}")]
    InvalidResult(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ExecError {
    fn from(e: std::io::Error) -> Self {
        ExecError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ExecError {
    fn from(e: serde_json::Error) -> Self {
        ExecError::InvalidResult(e.to_string())
    }
}
