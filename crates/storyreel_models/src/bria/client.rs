//! The submit/poll protocol.

use super::response::{PollStatus, extract_result_url, image_payload};
use super::transport::{HttpImageTransport, ImageTransport};
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use storyreel_config::ImageConfig;
use storyreel_core::{ImageJob, ImageJobStatus, RetryPolicy};
use storyreel_error::{ImageGenError, ImageGenErrorKind, StoryreelResult};
use storyreel_interface::ImageGenerator;
use tokio_retry2::{Retry, RetryError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Client for an asynchronous image-generation service.
///
/// One call to [`ImageGenerator::generate`] runs the whole protocol:
///
/// 1. wait the pre-submission delay
/// 2. submit, retrying transport failures per the submission policy
/// 3. return an immediate result URL if the service sent one
/// 4. otherwise poll the `status_url` per the polling policy, waiting before
///    every poll, until a terminal status or the budget runs out
///
/// Every wait observes the cancellation token.
#[derive(Debug, Clone)]
pub struct BriaImageClient<T = HttpImageTransport> {
    transport: T,
    pre_submit_delay: Duration,
    submission: RetryPolicy,
    polling: RetryPolicy,
}

impl BriaImageClient<HttpImageTransport> {
    /// Production client built from configuration.
    pub fn from_config(config: &ImageConfig) -> StoryreelResult<Self> {
        Ok(Self::with_transport(
            HttpImageTransport::from_config(config)?,
            config,
        ))
    }
}

impl<T: ImageTransport> BriaImageClient<T> {
    /// Client over an arbitrary transport.
    pub fn with_transport(transport: T, config: &ImageConfig) -> Self {
        Self {
            transport,
            pre_submit_delay: config.pre_submit_delay(),
            submission: config.submission,
            polling: config.polling,
        }
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run the protocol for `job`, leaving its final status on it.
    ///
    /// A job that never reached the service keeps a `None` status unless it
    /// ends in failure.
    pub async fn run_job(
        &self,
        job: &mut ImageJob,
        cancel: &CancellationToken,
    ) -> StoryreelResult<String> {
        match self.run(job, cancel).await {
            Ok(url) => {
                job.status = Some(ImageJobStatus::Completed(url.clone()));
                info!(kind = %job.kind, "Image generated");
                Ok(url)
            }
            Err(e) => {
                let status = match e.kind {
                    ImageGenErrorKind::Timeout { .. } => ImageJobStatus::TimedOut,
                    ref other => ImageJobStatus::Failed(other.to_string()),
                };
                debug!(kind = %job.kind, status = %status, "Image job ended");
                job.status = Some(status);
                Err(e.into())
            }
        }
    }

    /// Submit with bounded retries, yielding the submission response body.
    async fn submit(
        &self,
        job: &ImageJob,
        cancel: &CancellationToken,
    ) -> Result<Value, ImageGenError> {
        let payload = image_payload(job);
        let attempts = AtomicU32::new(0);
        let (transport, payload_ref, attempts_ref) = (&self.transport, &payload, &attempts);

        let submission = Retry::spawn(self.submission.delays(), move || async move {
            let attempt = attempts_ref.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(kind = %job.kind, attempt, "Submitting image job");
            transport.submit(payload_ref).await.map_err(|e| {
                warn!(kind = %job.kind, attempt, error = %e, "Image submission failed");
                RetryError::Transient {
                    err: e,
                    retry_after: None,
                }
            })
        });

        let outcome = with_cancel(cancel, submission).await?;
        outcome.map_err(|e| {
            ImageGenError::new(ImageGenErrorKind::SubmissionFailed {
                attempts: attempts.load(Ordering::SeqCst),
                message: e.kind.to_string(),
            })
        })
    }

    /// Poll until a terminal status, the budget runs out, or cancellation.
    async fn poll(
        &self,
        job: &ImageJob,
        status_url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ImageGenError> {
        let max = self.polling.max_attempts;
        for attempt in 1..=max {
            with_cancel(cancel, tokio::time::sleep(self.polling.delay())).await?;

            let body = match with_cancel(cancel, self.transport.poll(status_url)).await? {
                Ok(body) => body,
                Err(e) => {
                    warn!(kind = %job.kind, attempt, error = %e, "Poll failed, counting attempt");
                    continue;
                }
            };

            match PollStatus::from_body(&body) {
                PollStatus::Completed => {
                    return extract_result_url(&body).ok_or_else(|| {
                        ImageGenError::new(ImageGenErrorKind::MalformedResponse(format!(
                            "completed without a result URL: {}",
                            body
                        )))
                    });
                }
                PollStatus::Failed(reason) => {
                    warn!(kind = %job.kind, attempt, reason = %reason, "Image job failed");
                    return Err(ImageGenError::new(ImageGenErrorKind::GenerationFailed(
                        reason,
                    )));
                }
                PollStatus::Pending(status) => {
                    debug!(kind = %job.kind, attempt, max, status = %status, "Image job pending");
                }
            }
        }

        warn!(kind = %job.kind, attempts = max, "Image job timed out");
        Err(ImageGenError::new(ImageGenErrorKind::Timeout { attempts: max }))
    }

    /// The protocol, with the job's status advanced as it goes.
    async fn run(
        &self,
        job: &mut ImageJob,
        cancel: &CancellationToken,
    ) -> Result<String, ImageGenError> {
        with_cancel(cancel, tokio::time::sleep(self.pre_submit_delay)).await?;

        let response = self.submit(job, cancel).await?;
        job.status = Some(ImageJobStatus::Submitted);
        if let Some(url) = extract_result_url(&response) {
            info!(kind = %job.kind, "Image ready without polling");
            return Ok(url);
        }

        let Some(status_url) = response
            .get("status_url")
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            return Err(ImageGenError::new(ImageGenErrorKind::MalformedResponse(
                format!("no result URL or status_url in response: {}", response),
            )));
        };

        job.status = Some(ImageJobStatus::Polling);
        debug!(kind = %job.kind, status_url = %status_url, "Polling image job");
        self.poll(job, &status_url, cancel).await
    }
}

/// Race `fut` against the token; cancellation wins ties.
async fn with_cancel<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, ImageGenError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ImageGenError::new(ImageGenErrorKind::Cancelled)),
        out = fut => Ok(out),
    }
}

#[async_trait]
impl<T: ImageTransport> ImageGenerator for BriaImageClient<T> {
    #[instrument(skip(self, job, cancel), fields(kind = %job.kind, references = job.references.len()))]
    async fn generate(
        &self,
        job: &ImageJob,
        cancel: &CancellationToken,
    ) -> StoryreelResult<String> {
        let mut job = job.clone();
        self.run_job(&mut job, cancel).await
    }

    #[instrument(skip(self), fields(dest = %dest.display()))]
    async fn download(&self, url: &str, dest: &Path) -> StoryreelResult<()> {
        let bytes = self.transport.fetch(url).await?;

        let temp_path = dest.with_extension("tmp");
        let download_error =
            |e: std::io::Error| ImageGenError::new(ImageGenErrorKind::Download(e.to_string()));
        tokio::fs::write(&temp_path, &bytes)
            .await
            .map_err(download_error)?;
        tokio::fs::rename(&temp_path, dest)
            .await
            .map_err(download_error)?;

        debug!(size = bytes.len(), "Image downloaded");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "bria"
    }
}
