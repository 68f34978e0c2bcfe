//! Conversation state with the text model for one run.

use crate::extraction::{parse_characters, parse_scenes};
use crate::prompts;
use std::sync::Arc;
use storyreel_core::{CharacterSpec, GenerateRequest, Message, ScenePlan};
use storyreel_error::{StoryreelResult, TextGenError, TextGenErrorKind};
use storyreel_interface::TextGenerator;
use tracing::{debug, info, instrument, warn};

/// A stateful conversation about one story.
///
/// The session is opened with the story, so later questions (characters,
/// scenes, image prompts) are answered in its context. It is owned by a
/// single run and passed `&mut` to whoever needs to ask.
pub struct StorySession {
    generator: Arc<dyn TextGenerator>,
    story: String,
    history: Vec<Message>,
    active: bool,
}

impl std::fmt::Debug for StorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorySession")
            .field("provider", &self.generator.provider_name())
            .field("turns", &self.history.len())
            .field("active", &self.active)
            .finish()
    }
}

impl StorySession {
    /// Open a session by sending the story.
    #[instrument(skip_all, fields(provider = generator.provider_name(), story_len = tracing::field::Empty))]
    pub async fn start(
        generator: Arc<dyn TextGenerator>,
        story: impl Into<String>,
    ) -> StoryreelResult<Self> {
        let story = story.into();
        tracing::Span::current().record("story_len", story.len());
        let mut session = Self {
            generator,
            story,
            history: Vec::new(),
            active: true,
        };
        let intro = prompts::session_intro(&session.story);
        let ack = session.ask(&intro).await?;
        debug!(ack = %ack.chars().take(100).collect::<String>(), "Story session started");
        Ok(session)
    }

    /// The story this session is about.
    pub fn story(&self) -> &str {
        &self.story
    }

    /// Conversation so far.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// True until [`close`](Self::close) is called.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Send one turn and record the exchange.
    ///
    /// A failed turn leaves the history unchanged.
    pub async fn ask(&mut self, prompt: &str) -> StoryreelResult<String> {
        if !self.active {
            return Err(TextGenError::new(TextGenErrorKind::SessionInactive).into());
        }

        let mut messages = self.history.clone();
        messages.push(Message::user(prompt));
        let request = GenerateRequest {
            messages,
            ..GenerateRequest::default()
        };

        let response = self.generator.generate(&request).await?;
        self.history.push(Message::user(prompt));
        self.history.push(Message::assistant(response.text.clone()));
        Ok(response.text)
    }

    /// Characters appearing in the story; none if the model fails or replies
    /// with something unparseable.
    #[instrument(skip(self))]
    pub async fn identify_characters(&mut self) -> Vec<CharacterSpec> {
        match self.ask(&prompts::identify_characters()).await {
            Ok(reply) => {
                let specs = parse_characters(&reply);
                info!(count = specs.len(), "Identified characters");
                specs
            }
            Err(e) => {
                warn!(error = %e, "Character identification failed, continuing without characters");
                Vec::new()
            }
        }
    }

    /// The story broken into scenes; falls back to one scene per sentence.
    #[instrument(skip(self, character_names), fields(characters = character_names.len()))]
    pub async fn decompose_scenes(&mut self, character_names: &[String]) -> Vec<ScenePlan> {
        let plans = match self.ask(&prompts::decompose_scenes(character_names)).await {
            Ok(reply) => parse_scenes(&reply, &self.story),
            Err(e) => {
                warn!(error = %e, "Scene decomposition failed, splitting story into sentences");
                crate::extraction::sentence_scenes(&self.story)
            }
        };
        info!(count = plans.len(), "Decomposed story into scenes");
        plans
    }

    /// A compact image prompt for a scene; the raw description on failure.
    pub async fn image_prompt(&mut self, scene_description: &str) -> String {
        match self.ask(&prompts::image_prompt(scene_description)).await {
            Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
            Ok(_) => scene_description.to_string(),
            Err(e) => {
                warn!(error = %e, "Prompt rewrite failed, using raw scene description");
                scene_description.to_string()
            }
        }
    }

    /// The most prominent of `candidates` in a scene.
    ///
    /// A single candidate is returned without asking. A reply that names no
    /// candidate, or a failed call, yields the first candidate. Returns `None`
    /// only for an empty candidate list.
    pub async fn select_character(
        &mut self,
        scene_description: &str,
        candidates: &[String],
    ) -> Option<String> {
        let first = candidates.first()?;
        if candidates.len() == 1 {
            return Some(first.clone());
        }

        let reply = match self
            .ask(&prompts::select_character(scene_description, candidates))
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Character selection failed, using first candidate");
                return Some(first.clone());
            }
        };

        let answer = reply.trim().trim_matches(|c: char| c == '"' || c == '\'' || c == '.');
        match candidates.iter().find(|c| c.as_str() == answer) {
            Some(chosen) => Some(chosen.clone()),
            None => {
                debug!(reply = %answer, "Selection named no candidate, using first");
                Some(first.clone())
            }
        }
    }

    /// End the conversation. Further questions fail with `SessionInactive`.
    pub fn close(&mut self) {
        if self.active {
            debug!(turns = self.history.len(), "Story session closed");
        }
        self.active = false;
        self.history.clear();
    }
}

/// Write a short story around `context`, outside any session.
#[instrument(skip(generator, context), fields(provider = generator.provider_name()))]
pub async fn generate_story(
    generator: &dyn TextGenerator,
    context: &str,
) -> StoryreelResult<String> {
    let response = generator
        .generate(&GenerateRequest::prompt(prompts::story_from_prompt(context)))
        .await?;
    let story = response.text.trim().to_string();
    if story.is_empty() {
        return Err(TextGenError::new(TextGenErrorKind::EmptyResponse).into());
    }
    info!(words = story.split_whitespace().count(), "Generated story");
    Ok(story)
}
