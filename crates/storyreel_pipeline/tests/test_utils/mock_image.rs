//! Image generator recording every job.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use storyreel_core::ImageJob;
use storyreel_error::{ImageGenError, ImageGenErrorKind, StoryreelResult};
use storyreel_interface::ImageGenerator;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Which jobs fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFailure {
    /// Every job succeeds
    #[default]
    None,
    /// Jobs carrying a reference image fail
    ReferenceGuided,
    /// Portrait jobs fail
    Portraits,
    /// Scene jobs fail
    Scenes,
    /// Scene jobs block until cancelled
    HangOnScenes,
    /// Reference-guided jobs succeed but their images cannot be downloaded
    ReferenceDownload,
}

/// Records jobs and hands out sequential URLs.
#[derive(Default)]
pub struct MockImageGenerator {
    failure: ImageFailure,
    jobs: Mutex<Vec<ImageJob>>,
    guided_urls: Mutex<Vec<String>>,
    downloads: Mutex<Vec<String>>,
    /// Signalled when a hanging job starts waiting
    pub hanging: Notify,
}

#[allow(dead_code)]
impl MockImageGenerator {
    /// Generator failing as described.
    pub fn failing(failure: ImageFailure) -> Self {
        Self {
            failure,
            ..Self::default()
        }
    }

    /// Every job received, in order.
    pub fn jobs(&self) -> Vec<ImageJob> {
        self.jobs.lock().unwrap().clone()
    }

    /// URLs successfully downloaded, in order.
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    /// Scene jobs only.
    pub fn scene_jobs(&self) -> Vec<ImageJob> {
        self.jobs()
            .into_iter()
            .filter(|j| j.kind == storyreel_core::ImageJobKind::Scene)
            .collect()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, job: &ImageJob, cancel: &CancellationToken) -> StoryreelResult<String> {
        let n = {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.push(job.clone());
            jobs.len()
        };

        let is_scene = job.kind == storyreel_core::ImageJobKind::Scene;
        let fail = match self.failure {
            ImageFailure::None => false,
            ImageFailure::ReferenceGuided => job.is_image_to_image(),
            ImageFailure::Portraits => !is_scene,
            ImageFailure::Scenes => is_scene,
            ImageFailure::HangOnScenes if is_scene => {
                self.hanging.notify_one();
                cancel.cancelled().await;
                return Err(ImageGenError::new(ImageGenErrorKind::Cancelled).into());
            }
            ImageFailure::HangOnScenes | ImageFailure::ReferenceDownload => false,
        };
        if fail {
            return Err(ImageGenError::new(ImageGenErrorKind::GenerationFailed(
                "scripted failure".to_string(),
            ))
            .into());
        }
        let url = format!("https://img.example/{n}.png");
        if job.is_image_to_image() {
            self.guided_urls.lock().unwrap().push(url.clone());
        }
        Ok(url)
    }

    async fn download(&self, url: &str, dest: &Path) -> StoryreelResult<()> {
        let guided = self.guided_urls.lock().unwrap().iter().any(|u| u == url);
        if self.failure == ImageFailure::ReferenceDownload && guided {
            return Err(ImageGenError::new(ImageGenErrorKind::Download(
                "scripted download failure".to_string(),
            ))
            .into());
        }
        tokio::fs::write(dest, b"\x89PNG-fake")
            .await
            .map_err(|e| ImageGenError::new(ImageGenErrorKind::Download(e.to_string())))?;
        self.downloads.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
