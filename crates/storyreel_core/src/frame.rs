//! Frame arithmetic tying narration length to video length.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Output frame rate in frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{} fps", _0)]
#[serde(transparent)]
pub struct FrameRate(u32);

impl FrameRate {
    /// Rate used when nothing else is configured.
    pub const DEFAULT: FrameRate = FrameRate(24);

    /// Wrap a frames-per-second value.
    pub const fn new(fps: u32) -> Self {
        Self(fps)
    }

    /// Frames per second.
    pub const fn fps(&self) -> u32 {
        self.0
    }

    /// Number of frames covering `duration`, rounded to the nearest frame.
    ///
    /// ```
    /// use std::time::Duration;
    /// use storyreel_core::FrameRate;
    ///
    /// let rate = FrameRate::new(24);
    /// assert_eq!(rate.frames_for(Duration::from_millis(2500)), 60);
    /// assert_eq!(rate.frames_for(Duration::ZERO), 0);
    /// ```
    pub fn frames_for(&self, duration: Duration) -> u32 {
        let frames = (duration.as_secs_f64() * f64::from(self.0)).round();
        if frames.is_finite() && frames > 0.0 {
            frames.min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }

    /// Playback time of `frames` frames.
    pub fn duration_of(&self, frames: u64) -> Duration {
        if self.0 == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(frames as f64 / f64::from(self.0))
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One still image held for a number of consecutive frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSpan {
    /// Image shown during the span
    pub image: PathBuf,
    /// Number of frames the image is held
    pub frames: u32,
}

/// The silent video track as run-length spans of repeated stills.
///
/// Spans are stored in scene order and a span of zero frames is never kept,
/// so a scene whose narration measured zero length contributes nothing.
///
/// ```
/// use storyreel_core::FrameSequence;
///
/// let mut seq = FrameSequence::new();
/// seq.push("scene_0.png", 60);
/// seq.push("scene_1.png", 0);
/// seq.push("scene_2.png", 36);
/// assert_eq!(seq.spans().len(), 2);
/// assert_eq!(seq.total_frames(), 96);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSequence {
    spans: Vec<FrameSpan>,
}

impl FrameSequence {
    /// Empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `frames` repetitions of `image`; zero-frame spans are dropped.
    pub fn push(&mut self, image: impl AsRef<Path>, frames: u32) {
        if frames == 0 {
            return;
        }
        self.spans.push(FrameSpan {
            image: image.as_ref().to_path_buf(),
            frames,
        });
    }

    /// Spans in playback order.
    pub fn spans(&self) -> &[FrameSpan] {
        &self.spans
    }

    /// Sum of all span lengths.
    pub fn total_frames(&self) -> u64 {
        self.spans.iter().map(|s| u64::from(s.frames)).sum()
    }

    /// True when no frame has been contributed.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Path of the first frame's image, which fixes the video dimensions.
    pub fn first_image(&self) -> Option<&Path> {
        self.spans.first().map(|s| s.image.as_path())
    }
}
