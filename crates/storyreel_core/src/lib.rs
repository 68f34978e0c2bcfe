//! Core data types for the Storyreel pipeline.
//!
//! This crate holds the plain data every other crate passes around: run
//! identity, scenes and characters, the frame arithmetic that ties narration
//! length to video length, bounded retry policies, progress reporting and the
//! request/response shapes of the text-generation capability.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod character;
mod frame;
mod image_job;
mod message;
mod progress;
mod retry;
mod run;
mod scene;

pub use character::{Character, CharacterSpec, ReferenceImage};
pub use frame::{FrameRate, FrameSequence, FrameSpan};
pub use image_job::{ImageJob, ImageJobKind, ImageJobStatus};
pub use message::{GenerateRequest, GenerateRequestBuilder, GenerateResponse, Message, Role};
pub use progress::{ProgressUpdate, RunStatus, Stage};
pub use retry::RetryPolicy;
pub use run::{OwnerId, RunId, RunRequest, SourceKind};
pub use scene::{NarrationClip, Scene, ScenePlan};
