use thiserror::Error;

/// Failure to obtain specs from the remote authority.
///
/// Never retried at this layer; it aborts the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("remote authority unreachable: {0}")]
    Transport(String),
    #[error("remote authority rejected claim ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid claim response: {0}")]
    InvalidResponse(String),
    #[error("claim client misconfigured: {0}")]
    Misconfigured(String),
}

/// Failure while shipping a spec's results. Logged by the dispatcher, never surfaced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("upload transport failed: {0}")]
    Transport(String),
    #[error("remote authority rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("failed to encode upload payload: {0}")]
    Encode(String),
    #[error("upload client misconfigured: {0}")]
    Misconfigured(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("claim failed: {0}")]
    Claim(#[from] ClaimError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<shard_model::ModelError> for CoreError {
    fn from(e: shard_model::ModelError) -> Self {
        CoreError::InvalidConfig(e.to_string())
    }
}
