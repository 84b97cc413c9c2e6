//! Progress outbound port. Dispatch reports per-contact completion here.

use crate::domain::DispatchRun;

/// Receives dispatch progress. Implemented by the UI (progress bar).
pub trait ProgressPort: Send + Sync {
    fn on_start(&self, total: usize);

    /// Called once per settled contact, in completion order.
    fn on_progress(&self, run: &DispatchRun);

    fn on_finish(&self, run: &DispatchRun);

    /// The batch was aborted (authentication failure); `run` holds the counts so far.
    fn on_abort(&self, run: &DispatchRun);
}

/// Discards progress events.
pub struct NoProgress;

impl ProgressPort for NoProgress {
    fn on_start(&self, _total: usize) {}
    fn on_progress(&self, _run: &DispatchRun) {}
    fn on_finish(&self, _run: &DispatchRun) {}
    fn on_abort(&self, _run: &DispatchRun) {}
}
