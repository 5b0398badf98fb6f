//! Video generation HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use vgen_models::GenerateVideoRequest;

use crate::error::{ClientError, ClientResult};

/// Default generation endpoint.
pub const DEFAULT_API_URL: &str = "http://localhost:3100/api/generate-video";

/// Capability to request one video from the generation service.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Ask the service to generate a video. `Ok` means the request was
    /// accepted with HTTP 200.
    async fn generate(&self, request: &GenerateVideoRequest) -> ClientResult<()>;
}

/// Configuration for the video API client.
#[derive(Debug, Clone)]
pub struct VideoApiConfig {
    /// Full URL of the generation endpoint
    pub url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for VideoApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(300), // rendering is slow
        }
    }
}

/// Client for the video generation service.
pub struct VideoApiClient {
    http: Client,
    config: VideoApiConfig,
}

impl VideoApiClient {
    /// Create a new client.
    pub fn new(config: VideoApiConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl VideoGenerator for VideoApiClient {
    async fn generate(&self, request: &GenerateVideoRequest) -> ClientResult<()> {
        info!("Request URL: {}", self.config.url);
        info!(
            "Request payload: {}",
            serde_json::to_string(request).unwrap_or_default()
        );

        let response = self
            .http
            .post(&self.config.url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = body_or_read_error(status, response.text().await);
            return Err(ClientError::RequestFailed { status, body });
        }

        debug!("Video service accepted request for {}", request.category);
        Ok(())
    }
}

/// Body of a rejected response. A body that cannot be read is reported in
/// its place so the failure log never shows an empty body silently.
fn body_or_read_error(status: StatusCode, body: reqwest::Result<String>) -> String {
    match body {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read body of HTTP {} response: {}", status.as_u16(), e);
            format!("<unreadable response body: {}>", e)
        }
    }
}
