//! Story-to-video orchestration.
//!
//! This crate turns a prompt or story into a narrated video by driving the
//! capabilities defined in `storyreel_interface`:
//!
//! 1. a [`StorySession`] holds the conversation with the text model
//! 2. characters are identified and given reference portraits, kept in a
//!    [`CharacterRegistry`] so every scene reuses the same reference
//! 3. the story is decomposed into scenes, each rendered by the
//!    [`SceneRenderer`] into a still plus a narration clip
//! 4. the stills and clips are assembled into the final artifact
//!
//! [`Pipeline`] runs these steps as a state machine with monotonic progress,
//! either awaited directly or in the background through a [`RunHandle`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extraction;
mod pipeline;
mod portraits;
mod progress;
mod prompts;
mod recorder;
mod registry;
mod renderer;
mod session;

pub use extraction::{extract_json, parse_characters, parse_json, parse_scenes, sentence_scenes};
pub use pipeline::{Pipeline, PipelineServices, PipelineSettings, RunHandle};
pub use portraits::{generate_portrait, portrait_prompts, sanitize_description};
pub use progress::{LogProgressSink, ProgressTracker, WatchProgressSink};
pub use recorder::{InMemoryRunRecorder, RunRecord};
pub use registry::CharacterRegistry;
pub use renderer::{EMPTY_NARRATION, RenderContext, SceneRenderer};
pub use session::{StorySession, generate_story};
