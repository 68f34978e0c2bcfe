//! Per-run character registry.

use std::collections::HashMap;
use storyreel_core::Character;

/// Characters registered for one run, keyed by exact name.
///
/// All stores happen before scene rendering starts, after which the registry
/// is only read. A stored character is never replaced, so every scene naming
/// it resolves to the same reference image.
///
/// ```
/// use storyreel_core::{Character, CharacterSpec, ReferenceImage};
/// use storyreel_pipeline::CharacterRegistry;
///
/// let mut registry = CharacterRegistry::new();
/// registry.store(Character::new(
///     CharacterSpec::new("Ava", "red scarf"),
///     ReferenceImage::new("https://img/ava.png", "char_r1_0_ava.png"),
/// ));
///
/// let found = registry.resolve(&["Milo".to_string(), "Ava".to_string()]);
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].reference_url(), "https://img/ava.png");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CharacterRegistry {
    characters: HashMap<String, Character>,
    order: Vec<String>,
}

impl CharacterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a character. Returns false, leaving the registry unchanged, if
    /// the name is already registered.
    pub fn store(&mut self, character: Character) -> bool {
        let name = character.name().clone();
        if self.characters.contains_key(&name) {
            tracing::debug!(character = %name, "Character already registered, keeping first reference");
            return false;
        }
        tracing::info!(character = %name, "Stored character");
        self.order.push(name.clone());
        self.characters.insert(name, character);
        true
    }

    /// Look up one character.
    pub fn get(&self, name: &str) -> Option<&Character> {
        self.characters.get(name)
    }

    /// Registered characters among `names`, in request order.
    ///
    /// Unknown names are skipped and repeated names appear once.
    pub fn resolve(&self, names: &[String]) -> Vec<&Character> {
        let mut resolved: Vec<&Character> = Vec::new();
        for name in names {
            match self.characters.get(name) {
                Some(c) if !resolved.iter().any(|r| r.name() == name) => resolved.push(c),
                Some(_) => {}
                None => tracing::debug!(character = %name, "Scene names an unregistered character"),
            }
        }
        resolved
    }

    /// Names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Number of registered characters.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forget every character.
    pub fn clear(&mut self) {
        self.characters.clear();
        self.order.clear();
    }
}
