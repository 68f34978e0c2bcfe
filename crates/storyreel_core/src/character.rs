//! Characters and their reference portraits.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A character as identified in the story, before any portrait exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSpec {
    /// Name used in scene character lists
    pub name: String,
    /// Short visual description
    #[serde(default)]
    pub description: String,
}

impl CharacterSpec {
    /// Create a spec.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A generated portrait usable as a reference image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ReferenceImage {
    /// Remote URL handed to image-to-image jobs
    url: String,
    /// Local copy of the portrait
    local_path: PathBuf,
}

impl ReferenceImage {
    /// Create a reference image.
    pub fn new(url: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            local_path: local_path.into(),
        }
    }
}

/// A registered character with its portrait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Character {
    /// Unique name within a run
    name: String,
    /// Visual description the portrait was generated from
    description: String,
    /// Generated portrait
    reference: ReferenceImage,
}

impl Character {
    /// Combine a spec with its generated portrait.
    pub fn new(spec: CharacterSpec, reference: ReferenceImage) -> Self {
        Self {
            name: spec.name,
            description: spec.description,
            reference,
        }
    }

    /// Remote URL of the portrait.
    pub fn reference_url(&self) -> &str {
        self.reference.url()
    }
}
