use storyreel::{StoryreelConfig, StoryreelErrorKind, TextGenErrorKind, services_from_config};

#[test]
fn missing_text_key_is_reported_by_name() -> anyhow::Result<()> {
    let mut config = StoryreelConfig::from_toml_str("")?;
    config.text.api_key_env = "STORYREEL_TEST_KEY_THAT_IS_NEVER_SET".to_string();

    let err = match services_from_config(&config) {
        Ok(_) => panic!("services built without an API key"),
        Err(e) => e,
    };

    match err.kind() {
        StoryreelErrorKind::Text(e) => assert_eq!(
            e.kind,
            TextGenErrorKind::MissingApiKey("STORYREEL_TEST_KEY_THAT_IS_NEVER_SET".to_string())
        ),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn verbose_raises_default_filter() {
    assert_eq!(storyreel::telemetry::default_filter(false), "info,storyreel=debug");
    assert_eq!(storyreel::telemetry::default_filter(true), "debug");
}
