use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Upper bound on how many specs a batched claim may return. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct BatchSize(usize);

impl BatchSize {
    pub const ONE: BatchSize = BatchSize(1);

    pub fn new(n: usize) -> Result<Self, ModelError> {
        if n == 0 {
            return Err(ModelError::InvalidBatchSize(n));
        }
        Ok(Self(n))
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<usize> for BatchSize {
    type Error = ModelError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<BatchSize> for usize {
    fn from(b: BatchSize) -> Self {
        b.0
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
