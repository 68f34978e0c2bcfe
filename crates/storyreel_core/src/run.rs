//! Run identity and the request that starts a run.

use serde::{Deserialize, Serialize};
use storyreel_error::{PipelineError, PipelineErrorKind, StoryreelResult};

const MAX_RUN_ID_LEN: usize = 64;

/// Opaque, validated identifier of one pipeline run.
///
/// Run ids namespace every working file (`audio_{id}_0.mp3`, ...), so they are
/// restricted to ASCII alphanumerics and `-`. An underscore inside an id would
/// let the `*_{id}_*` cleanup pattern match a different run's files.
///
/// # Examples
///
/// ```
/// use storyreel_core::RunId;
///
/// let id = RunId::parse("a1b2c3d4").unwrap();
/// assert_eq!(id.as_str(), "a1b2c3d4");
///
/// assert!(RunId::parse("bad_id").is_err());
/// assert_eq!(RunId::generate().as_str().len(), 8);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(try_from = "String", into = "String")]
pub struct RunId(String);

impl RunId {
    /// Validate a caller-supplied id.
    pub fn parse(raw: impl Into<String>) -> StoryreelResult<Self> {
        let raw = raw.into();
        if raw.is_empty() || raw.len() > MAX_RUN_ID_LEN {
            return Err(PipelineError::new(PipelineErrorKind::InvalidRequest(format!(
                "run id must be 1-{} characters, got {}",
                MAX_RUN_ID_LEN,
                raw.len()
            )))
            .into());
        }
        if let Some(bad) = raw.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-')) {
            return Err(PipelineError::new(PipelineErrorKind::InvalidRequest(format!(
                "run id '{}' contains '{}'; only ASCII letters, digits and '-' are allowed",
                raw, bad
            )))
            .into());
        }
        Ok(Self(raw))
    }

    /// Generate a fresh 8-character id.
    pub fn generate() -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self(id[..8].to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RunId {
    type Error = storyreel_error::StoryreelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<RunId> for String {
    fn from(id: RunId) -> Self {
        id.0
    }
}

/// Identity of the user who owns a run.
///
/// The pipeline never interprets it; it is only handed to the run recorder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_more::From)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wrap an owner identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the source text of a run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A short prompt; a story is synthesized from it first
    #[display("prompt")]
    Prompt,
    /// A complete story used as-is
    #[display("story")]
    Story,
}

impl SourceKind {
    /// Map the `is_full_story` flag of the public entry point.
    pub fn from_full_story(is_full_story: bool) -> Self {
        if is_full_story {
            SourceKind::Story
        } else {
            SourceKind::Prompt
        }
    }
}

/// Everything needed to start one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Identifier namespacing the run's files
    pub run_id: RunId,
    /// Prompt or story text
    pub source_text: String,
    /// How to interpret `source_text`
    pub source_kind: SourceKind,
    /// Owner identity, passed through to the recorder
    pub owner: Option<OwnerId>,
}

impl RunRequest {
    /// Build a request with a freshly generated run id and no owner.
    pub fn new(source_text: impl Into<String>, source_kind: SourceKind) -> Self {
        Self {
            run_id: RunId::generate(),
            source_text: source_text.into(),
            source_kind,
            owner: None,
        }
    }

    /// Replace the run id.
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    /// Attach an owner.
    pub fn with_owner(mut self, owner: OwnerId) -> Self {
        self.owner = Some(owner);
        self
    }
}
