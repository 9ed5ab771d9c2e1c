use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),
    #[error("empty {0}")]
    Empty(&'static str),
}
