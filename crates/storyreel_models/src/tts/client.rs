//! Google Translate TTS narrator.

use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use storyreel_config::{EncodeConfig, NarrationConfig};
use storyreel_core::NarrationClip;
use storyreel_error::{NarrationError, NarrationErrorKind, StoryreelResult};
use storyreel_interface::NarrationSynthesizer;
use tracing::{debug, instrument};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) storyreel";

/// Split `text` into chunks of at most `max_chars` characters, breaking at
/// whitespace where possible.
///
/// ```
/// use storyreel_models::chunk_text;
///
/// let chunks = chunk_text("the quick brown fox jumps", 10);
/// assert_eq!(chunks, vec!["the quick", "brown fox", "jumps"]);
/// assert!(chunk_text("   ", 10).is_empty());
/// ```
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// [`NarrationSynthesizer`] over the Google Translate speech endpoint.
///
/// The endpoint accepts short texts only, so narration is spoken in chunks
/// whose MP3 streams are concatenated. The clip length is measured with
/// `ffprobe` afterwards.
#[derive(Debug, Clone)]
pub struct GoogleTtsNarrator {
    http: Client,
    endpoint: String,
    language: String,
    chunk_chars: usize,
    ffprobe: String,
}

impl GoogleTtsNarrator {
    /// Build a narrator from configuration.
    pub fn from_config(
        config: &NarrationConfig,
        encode: &EncodeConfig,
    ) -> Result<Self, NarrationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| NarrationError::new(NarrationErrorKind::Request(e.to_string())))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
            chunk_chars: config.chunk_chars,
            ffprobe: encode.ffprobe.clone(),
        })
    }

    async fn speak_chunk(
        &self,
        chunk: &str,
        index: usize,
        total: usize,
    ) -> Result<Vec<u8>, NarrationError> {
        let (idx, total, textlen) = (
            index.to_string(),
            total.to_string(),
            chunk.chars().count().to_string(),
        );
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.language.as_str()),
                ("q", chunk),
                ("idx", idx.as_str()),
                ("total", total.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await
            .map_err(|e| NarrationError::new(NarrationErrorKind::Request(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NarrationError::new(NarrationErrorKind::Status {
                status_code: status.as_u16(),
                message,
            }));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| NarrationError::new(NarrationErrorKind::Request(e.to_string())))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl NarrationSynthesizer for GoogleTtsNarrator {
    #[instrument(skip(self, text), fields(chars = text.chars().count(), dest = %dest.display()))]
    async fn synthesize(&self, text: &str, dest: &Path) -> StoryreelResult<NarrationClip> {
        let chunks = chunk_text(text, self.chunk_chars);
        if chunks.is_empty() {
            return Err(
                NarrationError::new(NarrationErrorKind::Request("nothing to speak".into())).into(),
            );
        }

        let mut audio = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            audio.extend(self.speak_chunk(chunk, index, chunks.len()).await?);
        }

        let temp_path = dest.with_extension("tmp");
        let storage_error =
            |e: std::io::Error| NarrationError::new(NarrationErrorKind::Storage(e.to_string()));
        tokio::fs::write(&temp_path, &audio)
            .await
            .map_err(storage_error)?;
        tokio::fs::rename(&temp_path, dest)
            .await
            .map_err(storage_error)?;

        let duration = storyreel_media::probe_duration(&self.ffprobe, dest)
            .await
            .map_err(|e| NarrationError::new(NarrationErrorKind::Duration(e.kind.to_string())))?;

        debug!(chunks = chunks.len(), seconds = duration.as_secs_f64(), "Narration synthesized");
        Ok(NarrationClip::new(dest, duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_respect_limit() {
        let text = "Ava walked along the quiet harbor, watching the lighthouse blink as the fog rolled in.";
        for chunk in chunk_text(text, 20) {
            assert!(chunk.chars().count() <= 20, "{:?}", chunk);
        }
        assert_eq!(chunk_text(text, 20).join(" "), text);
    }

    #[test]
    fn long_words_are_split() {
        assert_eq!(chunk_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(chunk_text("hi abcdefghij yo", 4), vec!["hi", "abcd", "efgh", "ij", "yo"]);
    }
}
