//! Wire transport for the image protocol.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use storyreel_config::ImageConfig;
use storyreel_error::{ImageGenError, ImageGenErrorKind, StoryreelResult};

/// The three requests the image protocol makes.
///
/// Separated from the protocol logic so retry and polling behavior can be
/// exercised against scripted responses.
#[async_trait]
pub trait ImageTransport: Send + Sync {
    /// Submit a generation request.
    async fn submit(&self, payload: &Value) -> Result<Value, ImageGenError>;

    /// Fetch the status document of a pending job.
    async fn poll(&self, status_url: &str) -> Result<Value, ImageGenError>;

    /// Download a finished image.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageGenError>;
}

/// [`ImageTransport`] over HTTPS with the `api_token` header.
#[derive(Debug, Clone)]
pub struct HttpImageTransport {
    http: Client,
    endpoint: String,
    api_token: String,
}

impl HttpImageTransport {
    /// Build a transport from configuration, reading the token from the
    /// environment.
    pub fn from_config(config: &ImageConfig) -> StoryreelResult<Self> {
        let token = config.api_token()?;
        Ok(Self::new(config, token)?)
    }

    /// Build a transport with an explicit token.
    pub fn new(config: &ImageConfig, api_token: impl Into<String>) -> Result<Self, ImageGenError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ImageGenError::new(ImageGenErrorKind::Transport(e.to_string())))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_token: api_token.into(),
        })
    }

    async fn json_body(response: reqwest::Response) -> Result<Value, ImageGenError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ImageGenError::new(ImageGenErrorKind::Transport(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            ))));
        }
        response
            .json()
            .await
            .map_err(|e| ImageGenError::new(ImageGenErrorKind::MalformedResponse(e.to_string())))
    }
}

#[async_trait]
impl ImageTransport for HttpImageTransport {
    async fn submit(&self, payload: &Value) -> Result<Value, ImageGenError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("api_token", &self.api_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| ImageGenError::new(ImageGenErrorKind::Transport(e.to_string())))?;
        Self::json_body(response).await
    }

    async fn poll(&self, status_url: &str) -> Result<Value, ImageGenError> {
        let response = self
            .http
            .get(status_url)
            .header("api_token", &self.api_token)
            .send()
            .await
            .map_err(|e| ImageGenError::new(ImageGenErrorKind::Transport(e.to_string())))?;
        Self::json_body(response).await
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageGenError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ImageGenError::new(ImageGenErrorKind::Download(e.to_string())))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageGenError::new(ImageGenErrorKind::Download(e.to_string())))?;
        Ok(bytes.to_vec())
    }
}
