//! HTTP client for the remote authority that hands out specs and receives results.
//!
//! [`HttpApi`] implements both [`shard_core::ClaimApi`] and
//! [`shard_core::Uploader`], so one client serves the whole run loop.
//!
//! ## Endpoints
//! - `POST /runs/{runId}/instances` claim one spec
//! - `POST /runs/{runId}/cy/instances` claim up to `batchSize` specs
//! - `POST /instances/{instanceId}/results` upload a spec's results
//! - `PUT /instances/{instanceId}/output` upload the captured output

mod client;
pub use client::HttpApi;

mod config;
pub use config::ApiConfig;

mod error;
pub use error::ApiError;

mod payload;
pub use payload::{BatchedInstancesPayload, CreateInstancePayload, OutputPayload, ResultsPayload};
