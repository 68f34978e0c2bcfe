//! Storyreel - narrated videos from a prompt or a story
//!
//! Storyreel asks a text model to break a story into scenes, keeps every
//! character visually consistent by rendering scenes against one reference
//! portrait per character, narrates each scene, and encodes stills plus
//! narration into a single MP4.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storyreel::{LogProgressSink, Pipeline, PipelineSettings, StoryreelConfig, services_from_config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryreelConfig::load()?;
//!     let pipeline = Pipeline::new(services_from_config(&config)?, PipelineSettings::from_config(&config));
//!
//!     let video = pipeline
//!         .run_pipeline("A lighthouse keeper befriends a whale", false, None, Arc::new(LogProgressSink))
//!         .await?;
//!     println!("Video written to {}", video.display());
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `providers` (default) - Gemini, Bria and TTS clients plus [`services_from_config`]
//! - `api` - enables tests that call the real services
//!
//! # Architecture
//!
//! - `storyreel_error` - error types
//! - `storyreel_core` - data model (runs, scenes, characters, frames, progress)
//! - `storyreel_interface` - capability traits and progress sinks
//! - `storyreel_config` - layered TOML configuration
//! - `storyreel_media` - working files and ffmpeg encoding
//! - `storyreel_models` - remote service clients
//! - `storyreel_pipeline` - orchestration
//!
//! This crate re-exports everything for convenience.

pub use storyreel_config::*;
pub use storyreel_core::*;
pub use storyreel_error::*;
pub use storyreel_interface::*;
pub use storyreel_media::*;
pub use storyreel_pipeline::*;

#[cfg(feature = "providers")]
pub use storyreel_models::*;

#[cfg(feature = "providers")]
mod services;
#[cfg(feature = "providers")]
pub use services::services_from_config;

pub mod telemetry;
