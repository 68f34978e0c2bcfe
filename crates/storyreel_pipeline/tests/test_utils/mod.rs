//! Test utilities for pipeline tests.
//!
//! Scripted stand-ins for every remote capability, with call recording.

pub mod mock_assembler;
pub mod mock_image;
pub mod mock_narrator;
pub mod mock_text;

#[allow(unused_imports)]
pub use mock_assembler::MockAssembler;
#[allow(unused_imports)]
pub use mock_image::{ImageFailure, MockImageGenerator};
#[allow(unused_imports)]
pub use mock_narrator::MockNarrator;
#[allow(unused_imports)]
pub use mock_text::MockTextGenerator;

use std::sync::Arc;
use storyreel_pipeline::{Pipeline, PipelineServices, PipelineSettings};

/// Mocks wired into a pipeline, kept for inspection.
#[allow(dead_code)]
pub struct Harness {
    pub text: Arc<MockTextGenerator>,
    pub images: Arc<MockImageGenerator>,
    pub narrator: Arc<MockNarrator>,
    pub assembler: Arc<MockAssembler>,
    pub pipeline: Pipeline,
    pub dir: tempfile::TempDir,
}

#[allow(dead_code)]
impl Harness {
    /// Build a pipeline over the given mocks in a fresh temp directory.
    pub fn new(
        text: MockTextGenerator,
        images: MockImageGenerator,
        narrator: MockNarrator,
    ) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let text = Arc::new(text);
        let images = Arc::new(images);
        let narrator = Arc::new(narrator);
        let assembler = Arc::new(MockAssembler::default());

        let services = PipelineServices {
            text: text.clone(),
            images: images.clone(),
            narrator: narrator.clone(),
            assembler: assembler.clone(),
        };
        let mut settings = PipelineSettings::in_dir(dir.path());
        settings.portrait = storyreel_core::RetryPolicy::new(3, std::time::Duration::ZERO);

        Ok(Self {
            text,
            images,
            narrator,
            assembler,
            pipeline: Pipeline::new(services, settings),
            dir,
        })
    }

    /// Names of files left in the work directory.
    pub fn work_files(&self) -> Vec<String> {
        let work_dir = self.pipeline.settings().work_dir.clone();
        match std::fs::read_dir(work_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}
