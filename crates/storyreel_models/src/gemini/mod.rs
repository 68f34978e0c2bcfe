//! Gemini text generation.

mod client;
mod dto;

pub use client::GeminiClient;
