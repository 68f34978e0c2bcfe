//! Gemini REST client.

use super::dto::{GeminiRequest, GeminiResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use storyreel_config::TextConfig;
use storyreel_core::{GenerateRequest, GenerateResponse};
use storyreel_error::{StoryreelResult, TextGenError, TextGenErrorKind};
use storyreel_interface::TextGenerator;
use tokio_retry2::{Retry, RetryError, strategy::ExponentialBackoff, strategy::jitter};
use tracing::{debug, info, instrument, warn};

/// Text generation through the Gemini `generateContent` endpoint.
///
/// Transient failures (dropped connections, 408/429/5xx) are retried with
/// exponential backoff and jitter, using parameters chosen from the first
/// error's kind. Permanent failures return immediately.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a client reading the API key from the configured variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or the HTTP client cannot be
    /// built.
    #[instrument(skip_all, fields(model = %config.model))]
    pub fn from_config(config: &TextConfig) -> Result<Self, TextGenError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            TextGenError::new(TextGenErrorKind::MissingApiKey(config.api_key_env.clone()))
        })?;
        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key.
    #[instrument(skip_all, fields(model = %config.model))]
    pub fn with_api_key(
        api_key: impl Into<String>,
        config: &TextConfig,
    ) -> Result<Self, TextGenError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TextGenError::new(TextGenErrorKind::ClientCreation(e.to_string())))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn send_once(
        &self,
        model: &str,
        body: &GeminiRequest,
    ) -> Result<GenerateResponse, TextGenError> {
        let url = self.endpoint(model);
        debug!(url = %url, "Sending Gemini request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| TextGenError::new(TextGenErrorKind::ApiRequest(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TextGenError::new(TextGenErrorKind::HttpError {
                status_code: status.as_u16(),
                message,
            }));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| TextGenError::new(TextGenErrorKind::Decode(e.to_string())))?;
        GenerateResponse::try_from(parsed)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip(self, req), fields(model = %self.model, messages = req.messages.len()))]
    async fn generate(&self, req: &GenerateRequest) -> StoryreelResult<GenerateResponse> {
        let model = req.model.clone().unwrap_or_else(|| self.model.clone());
        let body = GeminiRequest::from(req);

        let first = match self.send_once(&model, &body).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };
        if !first.kind.is_retryable() {
            warn!(error = %first, "Permanent Gemini error, failing immediately");
            return Err(first.into());
        }

        let (initial_ms, max_retries, max_delay_secs) = first.kind.retry_strategy_params();
        info!(
            error = %first,
            initial_backoff_ms = initial_ms,
            max_retries,
            max_delay_secs,
            "Gemini request failed, will retry with configured strategy"
        );

        let strategy = ExponentialBackoff::from_millis(initial_ms)
            .factor(2)
            .max_delay(Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(max_retries);

        let this = self;
        let model = model.as_str();
        let body = &body;
        let response = Retry::spawn(strategy, move || async move {
            match this.send_once(model, body).await {
                Ok(response) => Ok(response),
                Err(e) if e.kind.is_retryable() => {
                    warn!(error = %e, "Gemini request failed, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Permanent Gemini error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await?;

        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
