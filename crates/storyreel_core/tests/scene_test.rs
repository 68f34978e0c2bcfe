use std::time::Duration;
use storyreel_core::{FrameRate, FrameSequence, RetryPolicy, Scene, ScenePlan};

#[test]
fn missing_narration_defaults_to_description() {
    let plan: ScenePlan =
        serde_json::from_str(r#"{"description": "A quiet harbor", "characters": ["Ava"]}"#)
            .unwrap();
    let scene = Scene::from_plan(0, plan);
    assert_eq!(scene.narration, "A quiet harbor");
    assert_eq!(scene.characters, vec!["Ava".to_string()]);
}

#[test]
fn missing_description_defaults_to_narration() {
    let plan: ScenePlan = serde_json::from_str(r#"{"narration": "Ava waves."}"#).unwrap();
    let scene = Scene::from_plan(3, plan);
    assert_eq!(scene.index, 3);
    assert_eq!(scene.description, "Ava waves.");
    assert!(!scene.contributes_frames());
}

#[test]
fn frame_count_rounds_to_nearest_frame() {
    let rate = FrameRate::default();
    assert_eq!(rate.fps(), 24);
    assert_eq!(rate.frames_for(Duration::from_millis(1500)), 36);
    assert_eq!(rate.frames_for(Duration::from_millis(1010)), 24);
    assert_eq!(rate.frames_for(Duration::from_millis(1030)), 25);
}

#[test]
fn frame_sequence_skips_empty_scenes() {
    let rate = FrameRate::new(24);
    let mut seq = FrameSequence::new();
    seq.push("a.png", rate.frames_for(Duration::from_millis(2500)));
    seq.push("b.png", rate.frames_for(Duration::ZERO));
    seq.push("c.png", rate.frames_for(Duration::from_millis(1500)));

    assert_eq!(seq.total_frames(), 96);
    assert_eq!(seq.first_image().and_then(|p| p.to_str()), Some("a.png"));
    assert!((rate.duration_of(seq.total_frames()).as_secs_f64() - 4.0).abs() < 1e-9);
}

#[test]
fn retry_policy_presets_match_service_budget() {
    assert_eq!(RetryPolicy::SUBMISSION.max_attempts, 3);
    assert_eq!(RetryPolicy::SUBMISSION.delay(), Duration::from_secs(5));
    assert_eq!(RetryPolicy::POLLING.ceiling(), Duration::from_secs(126));
    assert!(RetryPolicy::new(0, Duration::ZERO).validate("image.polling").is_err());
}
