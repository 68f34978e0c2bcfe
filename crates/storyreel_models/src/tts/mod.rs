//! Text-to-speech narration.

mod client;

pub use client::{GoogleTtsNarrator, chunk_text};
