//! Interpretation of image-service response bodies.

use serde_json::{Value, json};
use storyreel_core::ImageJob;

/// Request body for a job.
///
/// References are sent as an `images` array; without them the payload is a
/// plain text-to-image request.
///
/// ```
/// use storyreel_core::ImageJob;
/// use storyreel_models::image_payload;
///
/// let job = ImageJob::scene("a harbor").with_reference("https://img/ava.png");
/// let payload = image_payload(&job);
/// assert_eq!(payload["images"][0], "https://img/ava.png");
/// ```
pub fn image_payload(job: &ImageJob) -> Value {
    if job.is_image_to_image() {
        json!({ "prompt": job.prompt, "images": job.references })
    } else {
        json!({ "prompt": job.prompt })
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Find the result image URL in any of the shapes the service returns.
///
/// Checked in order: `result.url`, `result.image_url`, `result.result_url`,
/// top-level `url`, `result_url`, `image_url`, then `url` of the first
/// element of a `result` list.
pub fn extract_result_url(body: &Value) -> Option<String> {
    let result = body.get("result");
    let nested = result.filter(|r| r.is_object());

    ["url", "image_url", "result_url"]
        .iter()
        .find_map(|key| non_empty_str(nested.and_then(|r| r.get(key))))
        .or_else(|| {
            ["url", "result_url", "image_url"]
                .iter()
                .find_map(|key| non_empty_str(body.get(key)))
        })
        .or_else(|| {
            result
                .and_then(Value::as_array)
                .and_then(|list| list.first())
                .and_then(|first| non_empty_str(first.get("url")))
        })
}

/// Status reported by one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// `completed` or `ready`
    Completed,
    /// `failed` or `error`, with whatever reason the body carried
    Failed(String),
    /// Anything else, including a missing status
    Pending(String),
}

impl PollStatus {
    /// Classify a poll body; the status is compared case-insensitively.
    pub fn from_body(body: &Value) -> Self {
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match status.as_str() {
            "completed" | "ready" => PollStatus::Completed,
            "failed" | "error" => {
                let reason = body
                    .get("error")
                    .map(|e| match e {
                        Value::String(s) => s.clone(),
                        other => other
                            .get("message")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| other.to_string()),
                    })
                    .unwrap_or_else(|| format!("service reported status '{}'", status));
                PollStatus::Failed(reason)
            }
            _ => PollStatus::Pending(status),
        }
    }
}
