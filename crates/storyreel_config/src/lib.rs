//! Configuration for the Storyreel pipeline.
//!
//! Configuration is layered, later sources overriding earlier ones:
//! 1. Bundled defaults (`storyreel.toml` compiled into the crate)
//! 2. `~/.config/storyreel/storyreel.toml`
//! 3. `./storyreel.toml`
//! 4. An explicit file passed by the caller
//! 5. Environment variables `STORYREEL__<SECTION>__<KEY>`
//!
//! Secrets never live in these files; sections name the environment variable
//! holding each one.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod sections;

pub use config::StoryreelConfig;
pub use sections::{EncodeConfig, ImageConfig, NarrationConfig, PipelineConfig, TextConfig};
