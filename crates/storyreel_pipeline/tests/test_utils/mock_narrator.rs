//! Narrator with scripted clip durations.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use storyreel_core::NarrationClip;
use storyreel_error::{NarrationError, NarrationErrorKind, StoryreelResult};
use storyreel_interface::NarrationSynthesizer;

/// Returns clips of the scripted durations, repeating the last one.
pub struct MockNarrator {
    durations: Vec<Duration>,
    texts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockNarrator {
    /// Narrator producing these durations in order.
    pub fn new(durations: Vec<Duration>) -> Self {
        Self {
            durations,
            texts: Mutex::new(Vec::new()),
        }
    }

    /// Every clip is `secs` long.
    pub fn constant(secs: f64) -> Self {
        Self::new(vec![Duration::from_secs_f64(secs)])
    }

    /// Texts narrated so far.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl NarrationSynthesizer for MockNarrator {
    async fn synthesize(&self, text: &str, dest: &Path) -> StoryreelResult<NarrationClip> {
        let n = {
            let mut texts = self.texts.lock().unwrap();
            texts.push(text.to_string());
            texts.len()
        };
        let duration = self
            .durations
            .get(n - 1)
            .or(self.durations.last())
            .copied()
            .unwrap_or_default();

        tokio::fs::write(dest, b"ID3-fake")
            .await
            .map_err(|e| NarrationError::new(NarrationErrorKind::Storage(e.to_string())))?;
        Ok(NarrationClip::new(dest, duration))
    }
}
