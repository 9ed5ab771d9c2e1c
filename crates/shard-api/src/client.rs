use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Serialize, de::DeserializeOwned};
use shard_core::{ClaimApi, ClaimError, UploadError, UploadJob, Uploader};
use shard_model::{BatchSize, BatchedInstancesResponse, InstanceResponse, RunMeta, SpecStats};
use tracing::{debug, trace};

use crate::{
    config::ApiConfig,
    error::ApiError,
    payload::{BatchedInstancesPayload, CreateInstancePayload, OutputPayload, ResultsPayload},
};

const RECORD_KEY_HEADER: &str = "x-record-key";
const CLIENT_HEADER: &str = "x-shard-client";

/// reqwest-based client for the remote authority.
///
/// No retries are performed; a failed claim is returned to the caller as is.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
    cfg: ApiConfig,
}

impl HttpApi {
    pub fn new(cfg: ApiConfig) -> Result<Self, ApiError> {
        cfg.validate()?;
        let mut builder = Client::builder();
        if cfg.timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(cfg.timeout_ms));
        }
        Ok(Self {
            client: builder.build()?,
            base: cfg.base_url()?,
            cfg,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.cfg
    }

    /// Base URL extended by `segments`, each percent-encoded as a single path segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidConfig(format!("base url cannot carry a path: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn with_headers(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header(CLIENT_HEADER, concat!("shard/", env!("CARGO_PKG_VERSION")));
        match &self.cfg.record_key {
            Some(key) => req.header(RECORD_KEY_HEADER, key),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<String, ApiError> {
        let response = self.with_headers(req).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        trace!(target: "shard.api", %url, "POST");
        let body = self.send(self.client.post(url).json(body)).await?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("failed to parse response: {e}, body: {body}"))
        })
    }

    pub async fn upload_results(
        &self,
        instance_id: &str,
        payload: &ResultsPayload,
    ) -> Result<(), ApiError> {
        let url = self.url(&["instances", instance_id, "results"])?;
        trace!(target: "shard.api", %url, "POST");
        self.send(self.client.post(url).json(payload)).await?;
        Ok(())
    }

    pub async fn upload_output(&self, instance_id: &str, output: &str) -> Result<(), ApiError> {
        let url = self.url(&["instances", instance_id, "output"])?;
        trace!(target: "shard.api", %url, bytes = output.len(), "PUT");
        let payload = OutputPayload {
            output: output.to_string(),
        };
        self.send(self.client.put(url).json(&payload)).await?;
        Ok(())
    }
}

#[async_trait]
impl ClaimApi for HttpApi {
    async fn create_instance(&self, meta: &RunMeta) -> Result<InstanceResponse, ClaimError> {
        let resp: InstanceResponse = self
            .post_json(
                &["runs", meta.run_id.as_str(), "instances"],
                &CreateInstancePayload::from(meta),
            )
            .await?;
        debug!(
            target: "shard.api",
            spec = ?resp.spec,
            claimed = resp.claimed_instances,
            total = resp.total_instances,
            "instance claimed"
        );
        Ok(resp)
    }

    async fn create_batched_instances(
        &self,
        meta: &RunMeta,
        batch_size: BatchSize,
    ) -> Result<BatchedInstancesResponse, ClaimError> {
        let payload = BatchedInstancesPayload {
            instance: CreateInstancePayload::from(meta),
            batch_size,
        };
        let resp: BatchedInstancesResponse = self
            .post_json(&["runs", meta.run_id.as_str(), "cy", "instances"], &payload)
            .await?;
        debug!(
            target: "shard.api",
            specs = resp.specs.len(),
            claimed = resp.claimed_instances,
            total = resp.total_instances,
            "batch claimed"
        );
        Ok(resp)
    }
}

#[async_trait]
impl Uploader for HttpApi {
    async fn upload(&self, job: &UploadJob) -> Result<(), UploadError> {
        let payload = match job.result.spec(&job.unit.spec) {
            Some(run) => ResultsPayload {
                spec: run.spec.clone(),
                stats: run.stats,
                tests: run.tests.clone(),
                error: run.error.clone(),
            },
            None => ResultsPayload {
                spec: job.unit.spec.clone(),
                stats: SpecStats::default(),
                tests: Vec::new(),
                error: Some(
                    job.result
                        .error
                        .clone()
                        .unwrap_or_else(|| "no result reported for spec".to_string()),
                ),
            },
        };

        self.upload_results(&job.unit.instance_id, &payload).await?;
        self.upload_output(&job.unit.instance_id, job.output.as_str())
            .await?;
        Ok(())
    }
}
