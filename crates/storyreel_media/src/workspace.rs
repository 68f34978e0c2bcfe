//! Per-run working directory.

use std::path::{Path, PathBuf};
use storyreel_core::RunId;
use storyreel_error::{MediaError, MediaErrorKind, StoryreelResult};

/// Namespaced working files of one run.
///
/// Every intermediate file name embeds `_{run_id}_`, so concurrent runs can
/// share a work directory and [`cleanup`](Self::cleanup) removes exactly the
/// files of its own run.
///
/// # Layout
///
/// ```text
/// {work_dir}/audio_{run}_{i}.mp3       narration clip of scene i
/// {work_dir}/scene_{run}_{i}.png       still of scene i
/// {work_dir}/char_{run}_{slug}.png     character portrait
/// {work_dir}/video_{run}_silent.mp4    encoded frames
/// {work_dir}/audio_{run}_merged.mp3    concatenated narration
/// {output_dir}/output_{run}.mp4        final artifact
/// ```
#[derive(Debug, Clone)]
pub struct RunWorkspace {
    work_dir: PathBuf,
    output_dir: PathBuf,
    run_id: RunId,
}

impl RunWorkspace {
    /// Create both directories if needed.
    #[tracing::instrument(skip(work_dir, output_dir), fields(run_id = %run_id))]
    pub fn create(
        work_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        run_id: RunId,
    ) -> StoryreelResult<Self> {
        let work_dir = work_dir.into();
        let output_dir = output_dir.into();

        for dir in [&work_dir, &output_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                MediaError::new(MediaErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    dir.display(),
                    e
                )))
            })?;
        }

        tracing::debug!(work_dir = %work_dir.display(), "Prepared run workspace");
        Ok(Self {
            work_dir,
            output_dir,
            run_id,
        })
    }

    /// Run this workspace belongs to.
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Directory holding intermediates.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Narration clip of scene `index`.
    pub fn narration_path(&self, index: usize) -> PathBuf {
        self.work_dir
            .join(format!("audio_{}_{}.mp3", self.run_id, index))
    }

    /// Still image of scene `index`.
    pub fn scene_image_path(&self, index: usize) -> PathBuf {
        self.work_dir
            .join(format!("scene_{}_{}.png", self.run_id, index))
    }

    /// Portrait of character `index`; the slugged name is only a readable suffix.
    pub fn portrait_path(&self, index: usize, name: &str) -> PathBuf {
        self.work_dir.join(format!(
            "char_{}_{}_{}.png",
            self.run_id,
            index,
            slugify(name)
        ))
    }

    /// Encoded silent video.
    pub fn silent_video_path(&self) -> PathBuf {
        self.work_dir.join(format!("video_{}_silent.mp4", self.run_id))
    }

    /// Concatenated narration track.
    pub fn merged_audio_path(&self) -> PathBuf {
        self.work_dir.join(format!("audio_{}_merged.mp3", self.run_id))
    }

    /// Final artifact.
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(format!("output_{}.mp4", self.run_id))
    }

    /// Write `data` to `path` through a temporary sibling and a rename.
    #[tracing::instrument(skip(self, data), fields(run_id = %self.run_id, size = data.len()))]
    pub async fn write_atomic(&self, path: &Path, data: &[u8]) -> StoryreelResult<()> {
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            MediaError::new(MediaErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            MediaError::new(MediaErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::debug!(path = %path.display(), "Wrote working file");
        Ok(())
    }

    /// Remove every file of this run from the work directory.
    ///
    /// Failures on individual files are logged and skipped. Returns the number
    /// of files removed.
    #[tracing::instrument(skip(self), fields(run_id = %self.run_id))]
    pub async fn cleanup(&self) -> usize {
        let mut entries = match tokio::fs::read_dir(&self.work_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list work directory for cleanup");
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Stopped cleanup early");
                    break;
                }
            };
            if !self.owns(&entry.file_name().to_string_lossy()) {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(file = %entry.path().display(), error = %e, "Failed to remove working file")
                }
            }
        }

        tracing::info!(removed, "Cleaned up working files");
        removed
    }

    /// Working files are named `<kind>_<run id>_...` or `<kind>_<run id>.<ext>`.
    fn owns(&self, file_name: &str) -> bool {
        file_name
            .split_once('_')
            .and_then(|(_, rest)| rest.split(['_', '.']).next())
            .is_some_and(|id| id == self.run_id.as_str())
    }
}

/// File-name-safe form of a character name.
///
/// ```
/// assert_eq!(storyreel_media::slugify("Captain Ava O'Neil"), "captain-ava-o-neil");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "unnamed".to_string()
    } else {
        slug.to_string()
    }
}
