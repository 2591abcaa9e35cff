//! Request and response shapes of the backend content API.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Application-level success code carried in every response envelope.
pub const SUCCESS_CODE: i64 = 200;

/// Envelope wrapping every backend response.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, treating any non-200 code as a failure.
    pub fn into_data(self) -> Result<T> {
        if self.code != SUCCESS_CODE {
            return Err(PipelineError::Api(format!(
                "code {}: {}",
                self.code,
                self.message.unwrap_or_default()
            )));
        }
        self.data
            .ok_or_else(|| PipelineError::Api("response has no data".to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct UploadImageRequest<'a> {
    pub image_data: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct UploadImageData {
    #[serde(default)]
    pub file_name: Option<String>,
}

/// One prompt in a batch import request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPrompt {
    pub title: String,
    pub category_name: String,
    pub prompt: String,
    pub image_description: String,
    pub oss_short_links: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchImportRequest<'a> {
    pub prompts: &'a [ImportPrompt],
}

/// Per-batch tally reported by the import endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchResult {
    #[serde(default)]
    pub success_count: usize,
    #[serde(default)]
    pub failure_count: usize,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

impl BatchResult {
    pub fn error_messages(&self) -> &[String] {
        self.errors.as_deref().unwrap_or_default()
    }
}

/// A stored prompt as returned by the listing endpoint. Only the fields used
/// for spot checks are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListedPrompt {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
}
