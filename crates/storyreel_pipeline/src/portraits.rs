//! Character reference portraits.

use storyreel_core::{Character, CharacterSpec, ImageJob, ReferenceImage, RetryPolicy};
use storyreel_error::{ImageGenError, ImageGenErrorKind, StoryreelResult};
use storyreel_interface::ImageGenerator;
use storyreel_media::RunWorkspace;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Soften words image services commonly reject in character descriptions.
///
/// ```
/// use storyreel_pipeline::sanitize_description;
///
/// assert_eq!(sanitize_description("a young girl with a kite"), "a person with a kite");
/// ```
pub fn sanitize_description(description: &str) -> String {
    description
        .split_whitespace()
        .filter(|w| !w.eq_ignore_ascii_case("young"))
        .map(|w| {
            let lower = w.to_ascii_lowercase();
            let (core, rest) = lower.split_at(
                lower
                    .find(|c: char| !c.is_ascii_alphabetic())
                    .unwrap_or(lower.len()),
            );
            match core {
                "girl" | "boy" => format!("person{}", rest),
                _ => w.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Portrait prompts from most to least specific.
pub fn portrait_prompts(spec: &CharacterSpec) -> Vec<String> {
    let desc = sanitize_description(&spec.description);
    let name = &spec.name;
    vec![
        format!(
            "Cartoon illustration of {name}, {desc}, friendly expression, colorful, white background, digital art style"
        ),
        format!("Animated character {name}, {desc}, cartoon style, simple background"),
        format!("Friendly cartoon character, {desc}, illustration style"),
    ]
}

/// Generate and download the portrait of character `index`, trying
/// progressively more generic prompts until one succeeds.
///
/// At most `policy.max_attempts` prompts are tried, `policy.delay()` apart.
/// Cancellation ends the attempt loop immediately.
#[instrument(skip_all, fields(character = %spec.name))]
pub async fn generate_portrait(
    images: &dyn ImageGenerator,
    index: usize,
    spec: &CharacterSpec,
    workspace: &RunWorkspace,
    policy: RetryPolicy,
    cancel: &CancellationToken,
) -> StoryreelResult<Character> {
    let prompts = portrait_prompts(spec);
    let attempts = prompts.len().min(policy.max_attempts as usize);
    let dest = workspace.portrait_path(index, &spec.name);

    for (i, prompt) in prompts.into_iter().take(attempts).enumerate() {
        if i > 0 {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(ImageGenError::new(ImageGenErrorKind::Cancelled).into());
                }
                _ = tokio::time::sleep(policy.delay()) => {}
            }
        }

        let attempt = i + 1;
        let url = match images.generate(&ImageJob::portrait(prompt), cancel).await {
            Ok(url) => url,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                warn!(attempt, error = %e, "Portrait prompt rejected, trying a more generic one");
                continue;
            }
        };

        match images.download(&url, &dest).await {
            Ok(()) => {
                info!(attempt, "Portrait generated");
                return Ok(Character::new(spec.clone(), ReferenceImage::new(url, dest)));
            }
            Err(e) => warn!(attempt, error = %e, "Portrait download failed"),
        }
    }

    Err(ImageGenError::new(ImageGenErrorKind::PortraitExhausted {
        character: spec.name.clone(),
        attempts: attempts as u32,
    })
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_whole_words_only() {
        assert_eq!(sanitize_description("Young boy, curious"), "person, curious");
        assert_eq!(sanitize_description("youngster with boyish grin"), "youngster with boyish grin");
    }

    #[test]
    fn prompts_get_more_generic() {
        let prompts = portrait_prompts(&CharacterSpec::new("Ava", "a girl in a red scarf"));
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("Ava"));
        assert!(prompts[1].contains("Ava"));
        assert!(!prompts[2].contains("Ava"));
        assert!(prompts.iter().all(|p| p.contains("a person in a red scarf")));
    }
}
