//! Transport seam for the background-removal service

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Raw response body chunks of one exchange
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

/// Request body: original image and selection mask as data URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub image: String,
    pub mask: String,
}

/// Something that can open an event stream for a submission
#[async_trait]
pub trait RemovalService: Send + Sync {
    /// Send the request and return the response body as a byte stream
    async fn open(&self, request: &SubmissionRequest) -> Result<ByteStream>;
}

/// HTTP client for the hosted removal endpoint
#[derive(Debug, Clone)]
pub struct HttpRemovalService {
    client: reqwest::Client,
    url: String,
}

impl HttpRemovalService {
    pub fn new<S: Into<String>>(url: S, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| EditorError::network_error("Failed to create HTTP client", e))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &EditorConfig) -> Result<Self> {
        Self::new(config.service_url.clone(), config.request_timeout())
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RemovalService for HttpRemovalService {
    async fn open(&self, request: &SubmissionRequest) -> Result<ByteStream> {
        let body = serde_json::to_vec(request)
            .map_err(|e| EditorError::encode(format!("Failed to serialize request: {}", e)))?;
        info!(url = %self.url, bytes = body.len(), "posting submission");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .body(body)
            .send()
            .await
            .map_err(|e| EditorError::network_error("Failed to reach removal service", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EditorError::network_error(
                "Removal service rejected the request",
                format!("HTTP {}", status),
            ));
        }
        debug!(%status, "event stream opened");

        Ok(response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| EditorError::network_error("Removal service stream failed", e))
            })
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_json_shape() {
        let request = SubmissionRequest {
            image: "data:image/jpeg;base64,AA==".to_string(),
            mask: "data:image/png;base64,BB==".to_string(),
        };
        let json: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(json["image"], "data:image/jpeg;base64,AA==");
        assert_eq!(json["mask"], "data:image/png;base64,BB==");
    }

    #[test]
    fn test_client_from_config() {
        let config = EditorConfig::builder()
            .service_url("http://127.0.0.1:9/upload")
            .build()
            .unwrap();
        let service = HttpRemovalService::from_config(&config).unwrap();
        assert_eq!(service.url(), "http://127.0.0.1:9/upload");
    }
}
