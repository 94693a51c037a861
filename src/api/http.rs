//! reqwest implementation of [`ChatBackend`]

use super::{ChatBackend, ChatRequest, ChatResponse, UploadResult};
use crate::config::ServerConfig;
use crate::error::{Result, StaffroomError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the assistant server
///
/// A chat reply with a non-2xx status or a body that is not the expected JSON
/// shape is reported as an error. Upload replies are decoded whatever the
/// status, so a server-reported failure keeps its message.
///
/// # Examples
///
/// ```
/// use staffroom::api::HttpBackend;
/// use staffroom::config::ServerConfig;
///
/// let backend = HttpBackend::new(ServerConfig::default()).unwrap();
/// assert_eq!(backend.chat_url(), "http://localhost:8000/api/chat");
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    chat_url: String,
    upload_url: String,
}

impl HttpBackend {
    /// Create a backend for the given server
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: ServerConfig) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("staffroom/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StaffroomError::Http(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!(
            "Initialized HTTP backend: chat={}, upload={}",
            config.chat_url(),
            config.upload_url()
        );

        Ok(Self {
            client,
            chat_url: config.chat_url(),
            upload_url: config.upload_url(),
        })
    }

    /// URL of the chat endpoint
    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    /// URL of the upload endpoint
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

/// Check the status and decode a JSON body
async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!("Server returned error {}: {}", status, error_text);
        return Err(
            StaffroomError::Http(format!("Server returned {}: {}", status, error_text)).into(),
        );
    }

    let body = response.text().await.map_err(|e| {
        tracing::error!("Failed to read response body: {}", e);
        StaffroomError::Http(format!("Failed to read response body: {}", e))
    })?;

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!("Failed to parse response: {}", e);
        StaffroomError::Decode(format!("Failed to parse response: {}", e)).into()
    })
}

/// Decode an upload reply
///
/// The upload endpoint reports rejections as `{success: false, message}`,
/// sometimes with an error status. Such a body is returned as data; only a
/// body that does not decode falls back to the status check.
async fn decode_upload_response(response: reqwest::Response) -> Result<UploadResult> {
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        tracing::error!("Failed to read response body: {}", e);
        StaffroomError::Http(format!("Failed to read response body: {}", e))
    })?;

    match serde_json::from_str::<UploadResult>(&body) {
        Ok(result) => {
            if !status.is_success() {
                tracing::warn!("Server returned {} with upload result: {}", status, result.message);
            }
            Ok(result)
        }
        Err(e) if status.is_success() => {
            tracing::error!("Failed to parse response: {}", e);
            Err(StaffroomError::Decode(format!("Failed to parse response: {}", e)).into())
        }
        Err(_) => {
            tracing::error!("Server returned error {}: {}", status, body);
            Err(StaffroomError::Http(format!("Server returned {}: {}", status, body)).into())
        }
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        tracing::debug!(
            conversation_id = ?request.conversation_id,
            "Sending chat request to {}",
            self.chat_url
        );

        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Chat request failed: {}", e);
                StaffroomError::Http(format!("Chat request failed: {}", e))
            })?;

        decode_response(response).await
    }

    async fn upload_document(&self, file_name: &str, contents: Vec<u8>) -> Result<UploadResult> {
        tracing::debug!(
            bytes = contents.len(),
            "Uploading {} to {}",
            file_name,
            self.upload_url
        );

        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("application/json")
            .map_err(|e| StaffroomError::Http(format!("Invalid upload content type: {}", e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Upload request failed: {}", e);
                StaffroomError::Http(format!("Upload request failed: {}", e))
            })?;

        decode_upload_response(response).await
    }
}
