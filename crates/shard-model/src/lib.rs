//! Data model shared by the shard runner crates.
//!
//! Everything here is plain data: run identity, claimed work units, normalized
//! engine results and the per-spec summaries the run loop accumulates.

mod domain;
pub use domain::*;

mod error;
pub use error::ModelError;
