//! Client for the backend content API.
//!
//! The pipeline talks to three endpoints: image upload and batch import (both
//! admin-only, bearer token) and the public prompt listing used for spot
//! checks. `ContentApi` is the seam the stages depend on, so they can be
//! driven against an in-memory backend in tests.

mod types;

pub use types::{
    ApiEnvelope, BatchImportRequest, BatchResult, ImportPrompt, ListedPrompt, UploadImageData,
    UploadImageRequest, SUCCESS_CODE,
};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Settings;
use crate::error::{PipelineError, Result};

/// Operations the pipeline needs from the backend.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Upload an image given as a data URI; returns the host's short reference.
    async fn upload_image(&self, data_uri: &str) -> Result<String>;

    /// Submit one batch of prompts.
    async fn submit_batch(&self, prompts: &[ImportPrompt]) -> Result<BatchResult>;

    /// Fetch every stored prompt.
    async fn list_prompts(&self) -> Result<Vec<ListedPrompt>>;
}

/// Per-endpoint request timeouts.
#[derive(Debug, Clone, Copy)]
pub struct ApiTimeouts {
    pub upload: Duration,
    pub import: Duration,
    pub listing: Duration,
}

/// HTTP implementation of [`ContentApi`].
pub struct AdminApiClient {
    client: Client,
    base_url: String,
    token: String,
    timeouts: ApiTimeouts,
}

impl AdminApiClient {
    pub fn new(base_url: &str, token: &str, timeouts: ApiTimeouts) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            timeouts,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.api_base,
            &settings.admin_token,
            ApiTimeouts {
                upload: settings.upload_timeout,
                import: settings.import_timeout,
                listing: settings.listing_timeout,
            },
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn admin_post(&self, path: &str, timeout: Duration) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .timeout(timeout)
    }
}

/// Decode a response envelope, failing on HTTP or application errors.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PipelineError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let envelope: ApiEnvelope<T> = response
        .json()
        .await
        .map_err(|e| PipelineError::Api(format!("malformed response: {}", e)))?;
    envelope.into_data()
}

#[async_trait]
impl ContentApi for AdminApiClient {
    async fn upload_image(&self, data_uri: &str) -> Result<String> {
        debug!("Uploading image ({} bytes encoded)", data_uri.len());
        let response = self
            .admin_post("/admin/upload/image", self.timeouts.upload)
            .json(&UploadImageRequest {
                image_data: data_uri,
            })
            .send()
            .await?;

        let data: UploadImageData = read_envelope(response).await?;
        data.file_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| PipelineError::Api("upload response has no file_name".to_string()))
    }

    async fn submit_batch(&self, prompts: &[ImportPrompt]) -> Result<BatchResult> {
        debug!("Submitting batch of {} prompts", prompts.len());
        let response = self
            .admin_post("/admin/prompts/batch", self.timeouts.import)
            .json(&BatchImportRequest { prompts })
            .send()
            .await?;

        read_envelope(response).await
    }

    async fn list_prompts(&self) -> Result<Vec<ListedPrompt>> {
        let response = self
            .client
            .get(self.url("/prompts"))
            .timeout(self.timeouts.listing)
            .send()
            .await?;

        read_envelope(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let timeouts = ApiTimeouts {
            upload: Duration::from_secs(1),
            import: Duration::from_secs(1),
            listing: Duration::from_secs(1),
        };
        let client = AdminApiClient::new("http://localhost:16010/api/", "t", timeouts).unwrap();
        assert_eq!(client.base_url(), "http://localhost:16010/api");
        assert_eq!(
            client.url("/admin/prompts/batch"),
            "http://localhost:16010/api/admin/prompts/batch"
        );
    }
}
