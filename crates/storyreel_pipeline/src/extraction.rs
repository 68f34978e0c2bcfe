//! Utilities for extracting structured data from model replies.
//!
//! Model replies often wrap JSON in markdown code fences or surround it with
//! prose. Extraction is strict-then-fallback: callers always get a usable
//! value, and a reply that cannot be parsed degrades to a deterministic
//! default instead of failing the run.

use serde::de::DeserializeOwned;
use storyreel_core::{CharacterSpec, ScenePlan};
use storyreel_error::{StoryreelResult, TextGenError, TextGenErrorKind};

/// Extract JSON from a reply that may contain markdown or extra text.
///
/// Strategies, in order:
/// 1. Markdown code blocks: ```json ... ```
/// 2. Balanced brackets or braces, whichever opens first
///
/// # Errors
///
/// Returns an error if no JSON-looking text is found.
///
/// # Examples
///
/// ```
/// use storyreel_pipeline::extract_json;
///
/// let reply = "Sure! Here you go:\n```json\n[{\"name\": \"Ava\"}]\n```";
/// assert_eq!(extract_json(reply).unwrap(), "[{\"name\": \"Ava\"}]");
/// ```
pub fn extract_json(response: &str) -> StoryreelResult<String> {
    if let Some(json) = extract_from_code_block(response, "json") {
        return Ok(json);
    }

    let bracket_pos = response.find('[');
    let brace_pos = response.find('{');

    let order = match (bracket_pos, brace_pos) {
        (Some(b), Some(c)) if b < c => [('[', ']'), ('{', '}')],
        (Some(_), None) => [('[', ']'), ('{', '}')],
        _ => [('{', '}'), ('[', ']')],
    };
    for (open, close) in order {
        if let Some(json) = extract_balanced(response, open, close) {
            return Ok(json);
        }
    }

    Err(TextGenError::new(TextGenErrorKind::Decode(format!(
        "no JSON found in reply (length: {})",
        response.len()
    )))
    .into())
}

/// Extract and deserialize JSON from a reply.
pub fn parse_json<T: DeserializeOwned>(response: &str) -> StoryreelResult<T> {
    let json = extract_json(response)?;
    serde_json::from_str(&json).map_err(|e| {
        tracing::debug!(
            error = %e,
            preview = %json.chars().take(200).collect::<String>(),
            "Extracted JSON did not match the expected shape"
        );
        TextGenError::new(TextGenErrorKind::Decode(e.to_string())).into()
    })
}

/// Characters from an identification reply; anything unparseable yields none.
///
/// Entries with blank names are dropped and repeated names keep their first
/// description.
pub fn parse_characters(response: &str) -> Vec<CharacterSpec> {
    let parsed: Vec<CharacterSpec> = match parse_json(response) {
        Ok(specs) => specs,
        Err(e) => {
            tracing::warn!(error = %e, "Could not parse characters, continuing without any");
            return Vec::new();
        }
    };

    let mut specs: Vec<CharacterSpec> = Vec::with_capacity(parsed.len());
    for mut spec in parsed {
        spec.name = spec.name.trim().to_string();
        if spec.name.is_empty() || specs.iter().any(|s| s.name == spec.name) {
            continue;
        }
        specs.push(spec);
    }
    specs
}

/// Scenes from a decomposition reply, falling back to one scene per sentence
/// of `story` when the reply is unusable or empty.
pub fn parse_scenes(response: &str, story: &str) -> Vec<ScenePlan> {
    match parse_json::<Vec<ScenePlan>>(response) {
        Ok(plans) => {
            let plans: Vec<ScenePlan> = plans
                .into_iter()
                .filter(|p| !p.is_blank())
                .map(ScenePlan::normalized)
                .collect();
            if plans.is_empty() {
                tracing::warn!("Scene reply was empty, splitting story into sentences");
                sentence_scenes(story)
            } else {
                plans
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not parse scenes, splitting story into sentences");
            sentence_scenes(story)
        }
    }
}

/// One scene per `.`-separated sentence, with no characters.
///
/// ```
/// use storyreel_pipeline::sentence_scenes;
///
/// let scenes = sentence_scenes("Ava wakes. She sails.  ");
/// assert_eq!(scenes.len(), 2);
/// assert_eq!(scenes[1].narration, "She sails");
/// ```
pub fn sentence_scenes(story: &str) -> Vec<ScenePlan> {
    story
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ScenePlan::from_sentence)
        .collect()
}

/// Extract content from markdown code blocks.
///
/// Looks for ```language\n...\n``` first, then an unlabeled fence. A missing
/// closing fence takes everything to the end of the reply.
fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let pattern = format!("```{}", language);

    if let Some(start) = response.find(&pattern) {
        let content_start = start + pattern.len();
        let rest = &response[content_start..];
        let content = rest.find("```").map_or(rest, |end| &rest[..end]);
        return Some(content.trim().to_string());
    }

    if let Some(start) = response.find("```") {
        let content_start = start + 3;
        let skip_to = response[content_start..]
            .find('\n')
            .map(|n| content_start + n + 1)
            .unwrap_or(content_start);
        let rest = &response[skip_to..];
        let content = rest.find("```").map_or(rest, |end| &rest[..end]);
        return Some(content.trim().to_string());
    }

    None
}

/// Extract content between balanced delimiters, ignoring delimiters inside
/// string literals.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + c.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_unlabeled_fence() {
        let reply = "```\n[1, 2]\n```";
        assert_eq!(extract_from_code_block(reply, "json").as_deref(), Some("[1, 2]"));
    }

    #[test]
    fn truncated_fence_takes_the_rest() {
        let reply = "```json\n[{\"a\": 1}]";
        assert_eq!(extract_json(reply).unwrap(), "[{\"a\": 1}]");
    }

    #[test]
    fn balanced_extraction_ignores_brackets_in_strings() {
        let reply = r#"Result: [{"description": "a [bracketed] \"quote\""}] trailing ]"#;
        assert_eq!(
            extract_balanced(reply, '[', ']').as_deref(),
            Some(r#"[{"description": "a [bracketed] \"quote\""}]"#)
        );
    }

    #[test]
    fn unbalanced_input_yields_nothing() {
        assert_eq!(extract_balanced("[[1, 2]", '[', ']'), None);
    }
}
