mod test_utils;

use std::sync::Arc;
use storyreel_error::{StoryreelErrorKind, TextGenErrorKind};
use storyreel_pipeline::StorySession;
use test_utils::MockTextGenerator;

#[tokio::test]
async fn start_accepts_owned_and_borrowed_stories() -> anyhow::Result<()> {
    let text = Arc::new(MockTextGenerator::new("[]", "[]"));

    let owned = StorySession::start(text.clone(), String::from("Ava sails.")).await?;
    let borrowed = StorySession::start(text.clone(), "Milo swims.").await?;

    assert_eq!(owned.story(), "Ava sails.");
    assert_eq!(borrowed.story(), "Milo swims.");
    assert_eq!(owned.history().len(), 2);
    assert_eq!(text.count("video generation assistant"), 2);
    Ok(())
}

#[tokio::test]
async fn closed_session_refuses_questions() -> anyhow::Result<()> {
    let text = Arc::new(MockTextGenerator::new("[]", "[]"));
    let mut session = StorySession::start(text.clone(), "Ava sails.").await?;

    session.close();
    let err = session.ask("Anything else?").await.unwrap_err();

    assert!(!session.is_active());
    assert!(session.history().is_empty());
    match err.kind() {
        StoryreelErrorKind::Text(e) => assert_eq!(e.kind, TextGenErrorKind::SessionInactive),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(text.count("Anything else?"), 0);
    Ok(())
}
