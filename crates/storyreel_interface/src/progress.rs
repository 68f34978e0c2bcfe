//! Progress notification sinks.

use storyreel_core::ProgressUpdate;

/// Receives progress notifications from a run.
///
/// Reporting is fire-and-forget: a sink has no way to fail the run, so
/// implementations swallow their own errors.
pub trait ProgressSink: Send + Sync {
    /// Deliver one update.
    fn report(&self, update: &ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: &ProgressUpdate) {
        self(update)
    }
}

/// Sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn report(&self, _update: &ProgressUpdate) {}
}
