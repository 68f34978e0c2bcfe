use storyreel_core::RunId;
use storyreel_media::RunWorkspace;

#[test]
fn paths_are_namespaced_by_run() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let ws = RunWorkspace::create(
        dir.path().join("work"),
        dir.path().join("out"),
        RunId::parse("r1")?,
    )?;

    let name = |p: std::path::PathBuf| p.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(name(ws.narration_path(0)), "audio_r1_0.mp3");
    assert_eq!(name(ws.scene_image_path(2)), "scene_r1_2.png");
    assert_eq!(name(ws.portrait_path(1, "Ava Stone")), "char_r1_1_ava-stone.png");
    assert_eq!(name(ws.silent_video_path()), "video_r1_silent.mp4");
    assert_eq!(name(ws.merged_audio_path()), "audio_r1_merged.mp3");
    assert_eq!(ws.artifact_path(), dir.path().join("out").join("output_r1.mp4"));
    assert!(dir.path().join("work").is_dir());
    assert!(dir.path().join("out").is_dir());
    Ok(())
}

#[tokio::test]
async fn atomic_write_leaves_no_temp_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let ws = RunWorkspace::create(dir.path(), dir.path(), RunId::parse("r2")?)?;

    let path = ws.scene_image_path(0);
    ws.write_atomic(&path, b"png-bytes").await?;

    assert_eq!(std::fs::read(&path)?, b"png-bytes");
    assert!(!path.with_extension("tmp").exists());
    Ok(())
}

#[tokio::test]
async fn cleanup_removes_only_own_run() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let ours = RunWorkspace::create(dir.path(), dir.path().join("out"), RunId::parse("ab")?)?;
    let theirs = RunWorkspace::create(dir.path(), dir.path().join("out"), RunId::parse("ab-c")?)?;

    for path in [
        ours.narration_path(0),
        ours.scene_image_path(0),
        ours.portrait_path(0, "Ava"),
        ours.silent_video_path(),
        ours.merged_audio_path(),
        theirs.narration_path(0),
        theirs.scene_image_path(0),
        dir.path().join("notes.txt"),
    ] {
        std::fs::write(&path, b"x")?;
    }
    std::fs::write(ours.artifact_path(), b"final")?;

    assert_eq!(ours.cleanup().await, 5);

    assert!(!ours.narration_path(0).exists());
    assert!(!ours.silent_video_path().exists());
    assert!(theirs.narration_path(0).exists());
    assert!(theirs.scene_image_path(0).exists());
    assert!(dir.path().join("notes.txt").exists());
    assert!(ours.artifact_path().exists());
    Ok(())
}

#[test]
fn characters_with_matching_slugs_get_separate_portraits() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let ws = RunWorkspace::create(dir.path(), dir.path(), RunId::parse("r3")?)?;

    assert_eq!(storyreel_media::slugify("Ava Lee"), storyreel_media::slugify("ava-lee"));
    assert_ne!(ws.portrait_path(0, "Ava Lee"), ws.portrait_path(1, "ava-lee"));
    Ok(())
}

#[tokio::test]
async fn cleanup_ignores_runs_whose_id_is_an_index() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let zero = RunWorkspace::create(dir.path(), dir.path().join("out"), RunId::parse("0")?)?;
    let other = RunWorkspace::create(dir.path(), dir.path().join("out"), RunId::parse("x")?)?;

    std::fs::write(zero.portrait_path(0, "Ava"), b"x")?;
    std::fs::write(other.portrait_path(0, "Ava"), b"x")?;

    assert_eq!(zero.cleanup().await, 1);
    assert!(other.portrait_path(0, "Ava").exists());
    Ok(())
}
