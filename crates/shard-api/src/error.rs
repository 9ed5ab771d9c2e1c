use shard_core::{ClaimError, UploadError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote authority returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid api configuration: {0}")]
    InvalidConfig(String),
}

impl From<ApiError> for ClaimError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) => ClaimError::Transport(e.to_string()),
            ApiError::Status { status, body } => ClaimError::Rejected {
                status,
                message: body,
            },
            ApiError::InvalidResponse(msg) => ClaimError::InvalidResponse(msg),
            ApiError::InvalidConfig(msg) => ClaimError::Misconfigured(msg),
        }
    }
}

impl From<ApiError> for UploadError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) if e.is_builder() || e.is_decode() => UploadError::Encode(e.to_string()),
            ApiError::Http(e) => UploadError::Transport(e.to_string()),
            ApiError::Status { status, body } => UploadError::Rejected {
                status,
                message: body,
            },
            ApiError::InvalidResponse(msg) => UploadError::Transport(msg),
            ApiError::InvalidConfig(msg) => UploadError::Misconfigured(msg),
        }
    }
}
