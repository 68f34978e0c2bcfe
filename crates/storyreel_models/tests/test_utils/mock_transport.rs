//! Scripted image transport for protocol tests.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use storyreel_error::{ImageGenError, ImageGenErrorKind};
use storyreel_models::ImageTransport;

/// A single scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Respond with this body
    Json(Value),
    /// Fail at the transport level
    Fail(String),
}

/// Transport replaying scripted submit and poll replies.
///
/// Each script is consumed in order; once exhausted, its last reply repeats.
pub struct MockTransport {
    submit_script: Vec<MockReply>,
    poll_script: Vec<MockReply>,
    image_bytes: Vec<u8>,
    submit_calls: Mutex<usize>,
    poll_calls: Mutex<usize>,
    payloads: Mutex<Vec<Value>>,
}

impl MockTransport {
    /// Create a transport with the given scripts.
    pub fn new(submit_script: Vec<MockReply>, poll_script: Vec<MockReply>) -> Self {
        Self {
            submit_script,
            poll_script,
            image_bytes: b"\x89PNG-fake".to_vec(),
            submit_calls: Mutex::new(0),
            poll_calls: Mutex::new(0),
            payloads: Mutex::new(Vec::new()),
        }
    }

    /// Submission answers with a status URL; polls follow `poll_script`.
    pub fn pending(poll_script: Vec<MockReply>) -> Self {
        Self::new(
            vec![MockReply::Json(
                serde_json::json!({"status_url": "https://status.example/job/1"}),
            )],
            poll_script,
        )
    }

    /// Number of submit calls so far.
    pub fn submit_calls(&self) -> usize {
        *self.submit_calls.lock().unwrap()
    }

    /// Number of poll calls so far.
    pub fn poll_calls(&self) -> usize {
        *self.poll_calls.lock().unwrap()
    }

    /// Payloads submitted so far.
    #[allow(dead_code)]
    pub fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().unwrap().clone()
    }

    fn replay(script: &[MockReply], counter: &Mutex<usize>) -> Result<Value, ImageGenError> {
        let mut count = counter.lock().unwrap();
        let index = (*count).min(script.len().saturating_sub(1));
        *count += 1;
        match script.get(index) {
            Some(MockReply::Json(body)) => Ok(body.clone()),
            Some(MockReply::Fail(message)) => Err(ImageGenError::new(
                ImageGenErrorKind::Transport(message.clone()),
            )),
            None => Err(ImageGenError::new(ImageGenErrorKind::Transport(
                "no scripted reply".to_string(),
            ))),
        }
    }
}

#[async_trait]
impl ImageTransport for MockTransport {
    async fn submit(&self, payload: &Value) -> Result<Value, ImageGenError> {
        self.payloads.lock().unwrap().push(payload.clone());
        Self::replay(&self.submit_script, &self.submit_calls)
    }

    async fn poll(&self, _status_url: &str) -> Result<Value, ImageGenError> {
        Self::replay(&self.poll_script, &self.poll_calls)
    }

    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, ImageGenError> {
        Ok(self.image_bytes.clone())
    }
}
