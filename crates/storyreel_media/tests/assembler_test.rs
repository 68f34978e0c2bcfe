use storyreel_config::EncodeConfig;
use storyreel_core::{FrameRate, FrameSequence};
use storyreel_error::PipelineErrorKind;
use storyreel_interface::VideoAssembler;
use storyreel_media::FfmpegAssembler;

#[tokio::test]
async fn merging_no_clips_reports_no_audio() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let assembler = FfmpegAssembler::default();

    let err = assembler
        .merge_audio_clips(&[], &dir.path().join("merged.mp3"))
        .await
        .unwrap_err();
    assert_eq!(err.pipeline_kind(), Some(&PipelineErrorKind::NoAudio));
    Ok(())
}

#[tokio::test]
async fn encoding_empty_sequence_reports_no_content() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let assembler = FfmpegAssembler::default();

    let err = assembler
        .frames_to_video(&FrameSequence::new(), FrameRate::DEFAULT, &dir.path().join("v.mp4"))
        .await
        .unwrap_err();
    assert_eq!(err.pipeline_kind(), Some(&PipelineErrorKind::NoContent));
    Ok(())
}

#[tokio::test]
async fn missing_encoder_is_an_assembly_failure() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let assembler = FfmpegAssembler::new(EncodeConfig {
        ffmpeg: "storyreel-no-such-ffmpeg".to_string(),
        ..EncodeConfig::default()
    });

    let mut frames = FrameSequence::new();
    frames.push(dir.path().join("scene.png"), 24);
    let err = assembler
        .frames_to_video(&frames, FrameRate::DEFAULT, &dir.path().join("v.mp4"))
        .await
        .unwrap_err();

    match err.pipeline_kind() {
        Some(PipelineErrorKind::AssemblyFailed(msg)) => {
            assert!(msg.contains("storyreel-no-such-ffmpeg"))
        }
        other => panic!("expected AssemblyFailed, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn unknown_tool_is_not_on_path() {
    assert!(!storyreel_media::is_tool_on_path("storyreel-no-such-tool").await);
}

/// Stand-in encoder that answers `-version` and copies stdin into its last argument.
#[cfg(unix)]
fn fake_encoder(dir: &std::path::Path) -> anyhow::Result<String> {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-ffmpeg");
    std::fs::write(
        &script,
        "#!/bin/sh\nif [ \"$1\" = \"-version\" ]; then exit 0; fi\nfor a; do last=$a; done\nexec cat > \"$last\"\n",
    )?;
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
    Ok(script.to_string_lossy().into_owned())
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_frame_stops_encoder_and_removes_partial_video() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let assembler = FfmpegAssembler::new(EncodeConfig {
        ffmpeg: fake_encoder(dir.path())?,
        ..EncodeConfig::default()
    });

    let good = dir.path().join("scene_1.png");
    image::RgbaImage::new(4, 4).save(&good)?;
    let mut frames = FrameSequence::new();
    frames.push(good, 2);
    frames.push(dir.path().join("scene_2.png"), 2);

    let dest = dir.path().join("v.mp4");
    let err = assembler
        .frames_to_video(&frames, FrameRate::DEFAULT, &dest)
        .await
        .unwrap_err();

    match err.pipeline_kind() {
        Some(PipelineErrorKind::AssemblyFailed(msg)) => assert!(msg.contains("scene_2.png")),
        other => panic!("expected AssemblyFailed, got {:?}", other),
    }
    assert!(!dest.exists());
    Ok(())
}
