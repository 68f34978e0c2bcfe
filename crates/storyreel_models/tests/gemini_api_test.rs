//! Live tests against the real services.
//!
//! Run with `--features api` and GEMINI_API_KEY / BRIA_API_TOKEN set.

use storyreel_config::StoryreelConfig;
use storyreel_core::{GenerateRequest, ImageJob};
use storyreel_interface::{ImageGenerator, TextGenerator};
use storyreel_models::{BriaImageClient, GeminiClient};
use tokio_util::sync::CancellationToken;

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)] // Requires GEMINI_API_KEY
async fn gemini_answers_a_prompt() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = StoryreelConfig::load()?;
    let client = GeminiClient::from_config(&config.text)?;

    let response = client
        .generate(&GenerateRequest::prompt("Reply with the single word: ok"))
        .await?;

    assert!(!response.text.is_empty());
    assert_eq!(client.provider_name(), "gemini");
    Ok(())
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)] // Requires BRIA_API_TOKEN
async fn bria_generates_an_image() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = StoryreelConfig::load()?;
    let client = BriaImageClient::from_config(&config.image)?;

    let url = client
        .generate(
            &ImageJob::scene("A red kite over a green hill, cartoon style"),
            &CancellationToken::new(),
        )
        .await?;

    assert!(url.starts_with("http"));
    Ok(())
}
