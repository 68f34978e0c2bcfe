//! Progress tracking and the bundled sinks.

use std::sync::Arc;
use storyreel_core::{ProgressUpdate, Stage};
use storyreel_interface::ProgressSink;
use tokio::sync::watch;

/// Forwards updates to a sink, never letting the fraction go backwards.
pub struct ProgressTracker {
    sink: Arc<dyn ProgressSink>,
    last_fraction: f32,
    last_stage: Stage,
}

impl ProgressTracker {
    /// Track progress into `sink`.
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            last_fraction: 0.0,
            last_stage: Stage::GeneratingStory,
        }
    }

    /// Report the start of a stage with its default label.
    pub fn enter(&mut self, stage: Stage) {
        self.report(stage, stage.start(), stage.label());
    }

    /// Report progress within a stage.
    pub fn report(&mut self, stage: Stage, fraction: f32, label: impl Into<String>) {
        let fraction = fraction.clamp(0.0, 1.0).max(self.last_fraction);
        self.last_fraction = fraction;
        self.last_stage = stage;
        self.sink
            .report(&ProgressUpdate::new(stage, fraction, label));
    }

    /// Report [`Stage::Failed`] at the last reached fraction.
    pub fn fail(&mut self, reason: impl std::fmt::Display) {
        let label = format!("Failed: {}", reason);
        self.last_stage = Stage::Failed;
        self.sink
            .report(&ProgressUpdate::new(Stage::Failed, self.last_fraction, label));
    }

    /// Highest fraction reported so far.
    pub fn fraction(&self) -> f32 {
        self.last_fraction
    }

    /// Stage of the latest update.
    pub fn stage(&self) -> Stage {
        self.last_stage
    }
}

/// Sink logging each update through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn report(&self, update: &ProgressUpdate) {
        tracing::info!(
            percent = (update.fraction * 100.0).round() as u32,
            stage = %update.stage,
            "{}",
            update.label
        );
    }
}

/// Sink publishing the latest update on a `watch` channel.
#[derive(Debug)]
pub struct WatchProgressSink {
    sender: watch::Sender<ProgressUpdate>,
}

impl WatchProgressSink {
    /// Wrap a sender.
    pub fn new(sender: watch::Sender<ProgressUpdate>) -> Self {
        Self { sender }
    }

    /// Create a sink and a receiver starting at `initial`.
    pub fn channel(initial: ProgressUpdate) -> (Self, watch::Receiver<ProgressUpdate>) {
        let (sender, receiver) = watch::channel(initial);
        (Self::new(sender), receiver)
    }
}

impl ProgressSink for WatchProgressSink {
    fn report(&self, update: &ProgressUpdate) {
        self.sender.send_replace(update.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn tracker_never_reports_lower_fraction() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |u: &ProgressUpdate| seen.lock().unwrap().push(u.fraction)
        };
        let mut tracker = ProgressTracker::new(Arc::new(sink));

        tracker.enter(Stage::DecomposingScenes);
        tracker.report(Stage::GeneratingCharacterPortraits, 0.25, "late portrait update");
        tracker.fail("boom");

        assert_eq!(*seen.lock().unwrap(), vec![0.40, 0.40, 0.40]);
        assert_eq!(tracker.stage(), Stage::Failed);
    }

    #[test]
    fn watch_sink_keeps_latest() {
        let (sink, rx) = WatchProgressSink::channel(ProgressUpdate::at(Stage::Initializing));
        sink.report(&ProgressUpdate::at(Stage::Done));
        assert_eq!(rx.borrow().stage, Stage::Done);
    }
}
