//! Text generator answering by prompt kind.

use async_trait::async_trait;
use std::sync::Mutex;
use storyreel_core::{GenerateRequest, GenerateResponse};
use storyreel_error::{StoryreelResult, TextGenError, TextGenErrorKind};
use storyreel_interface::TextGenerator;

/// Replies keyed on the kind of question asked.
pub struct MockTextGenerator {
    story: String,
    characters: String,
    scenes: String,
    selection: Option<String>,
    fail_markers: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockTextGenerator {
    /// Generator replying with these character and scene JSON bodies.
    pub fn new(characters: impl Into<String>, scenes: impl Into<String>) -> Self {
        Self {
            story: "Ava found a lantern. Ava followed the light home.".to_string(),
            characters: characters.into(),
            scenes: scenes.into(),
            selection: None,
            fail_markers: Vec::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Story written for prompt-only runs.
    pub fn with_story(mut self, story: impl Into<String>) -> Self {
        self.story = story.into();
        self
    }

    /// Fixed reply to character-selection questions.
    pub fn with_selection(mut self, name: impl Into<String>) -> Self {
        self.selection = Some(name.into());
        self
    }

    /// Fail every prompt containing `marker`.
    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_markers.push(marker.into());
        self
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of prompts containing `marker`.
    pub fn count(&self, marker: &str) -> usize {
        self.prompts().iter().filter(|p| p.contains(marker)).count()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, req: &GenerateRequest) -> StoryreelResult<GenerateResponse> {
        let prompt = req.last_user_text().unwrap_or_default().to_string();
        self.prompts.lock().unwrap().push(prompt.clone());

        if self.fail_markers.iter().any(|m| prompt.contains(m.as_str())) {
            return Err(TextGenError::new(TextGenErrorKind::HttpError {
                status_code: 503,
                message: "scripted failure".to_string(),
            })
            .into());
        }

        let reply = if prompt.contains("Generate a creative story") {
            self.story.clone()
        } else if prompt.contains("video generation assistant") {
            "Understood, ready.".to_string()
        } else if prompt.contains("identify all unique characters") {
            self.characters.clone()
        } else if prompt.contains("Break the story into") {
            self.scenes.clone()
        } else if prompt.contains("Create a SHORT image prompt") {
            "storybook illustration, soft light".to_string()
        } else if prompt.contains("most prominent") {
            self.selection.clone().unwrap_or_default()
        } else {
            String::new()
        };
        Ok(GenerateResponse::new(reply))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-text"
    }
}
