//! Thin HTTP client for the Veo 2 long-running generation endpoints.
//!
//! - `submit` posts a generation request to `models/<id>:predictLongRunning`.
//! - `refresh` re-reads an operation's status by name.
//! - `download` fetches an artifact's bytes from its URI.
//!
//! The `VideoService` trait is the seam between this client and the poller,
//! materializer, and node, so all of them can run against a fake service in
//! tests.
use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, AppResult};
use crate::veo::types::{GenerationRequest, Operation};

/// Model identifier the submitter selects for every request.
pub const MODEL_ID: &str = "veo-2.0-generate-001";

/// Narrow interface to the remote generation service.
#[async_trait]
pub trait VideoService: Send + Sync {
    /// Submit a generation request, obtaining a handle to an async job.
    async fn submit(&self, request: &GenerationRequest) -> AppResult<Operation>;

    /// Re-query the status of a previously submitted job.
    async fn refresh(&self, operation: &Operation) -> AppResult<Operation>;

    /// Fetch the raw bytes of a generated artifact.
    async fn download(&self, uri: &str) -> AppResult<Vec<u8>>;
}

#[derive(Clone)]
pub struct VeoClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VeoClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        VeoClient { client: Client::new(), base_url: base, api_key }
    }
}

#[async_trait]
impl VideoService for VeoClient {
    async fn submit(&self, request: &GenerationRequest) -> AppResult<Operation> {
        request.validate()?;

        let url = format!("{}/v1beta/models/{}:predictLongRunning", self.base_url, MODEL_ID);
        tracing::info!("Submitting generation request to {}", url);
        tracing::debug!("Prompt: {:?}, aspect_ratio: {}", request.prompt, request.aspect_ratio);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request.to_submit_body())
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            let operation: Operation = response.json().await.map_err(AppError::HttpClient)?;
            tracing::info!("Submitted generation, operation: {}", operation.name);
            Ok(operation)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            let error_message =
                format!("Failed to submit generation. Status: {}, Body: {}", status, error_body);
            tracing::error!("{}", error_message);
            Err(AppError::Service(error_message))
        }
    }

    async fn refresh(&self, operation: &Operation) -> AppResult<Operation> {
        let url = format!("{}/v1beta/{}", self.base_url, operation.name);
        tracing::debug!("Refreshing operation {}", operation.name);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            response.json().await.map_err(AppError::HttpClient)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            Err(AppError::Service(format!(
                "Failed to refresh operation {}. Status: {}, Body: {}",
                operation.name, status, error_body
            )))
        }
    }

    async fn download(&self, uri: &str) -> AppResult<Vec<u8>> {
        tracing::info!("Downloading artifact from {}", uri);
        let response = self
            .client
            .get(uri)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(AppError::HttpClient)
        } else {
            Err(AppError::Service(format!(
                "Failed to download artifact: {:?}",
                response.status()
            )))
        }
    }
}
