//! Remote service clients for Storyreel.
//!
//! - [`GeminiClient`]: text generation over the Gemini `generateContent` REST API
//! - [`BriaImageClient`]: the asynchronous submit/poll image-generation protocol
//! - [`GoogleTtsNarrator`]: chunked text-to-speech with `ffprobe` duration measurement
//!
//! Each client implements the matching trait from `storyreel_interface`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bria;
mod gemini;
mod tts;

pub use bria::{
    BriaImageClient, HttpImageTransport, ImageTransport, PollStatus, extract_result_url,
    image_payload,
};
pub use gemini::GeminiClient;
pub use tts::{GoogleTtsNarrator, chunk_text};
