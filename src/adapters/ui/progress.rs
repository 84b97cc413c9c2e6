//! Implements ProgressPort with an indicatif bar.

use crate::domain::DispatchRun;
use crate::ports::ProgressPort;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

const BAR_TEMPLATE: &str = "{spinner:.yellow} [{bar:40.yellow/blue}] {pos}/{len} ({percent}%) {msg}";

/// Terminal progress bar for one dispatch run. Reusable across runs.
#[derive(Default)]
pub struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(bar) = guard.as_ref() {
            f(bar);
        }
    }
}

/// Closing line shown once every send has settled.
pub fn completion_line(run: &DispatchRun) -> String {
    format!(
        "Sending complete: {} out of {} messages sent successfully",
        run.success_count, run.total_count
    )
}

impl ProgressPort for BarProgress {
    fn on_start(&self, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.set_message("sending...");
        *self.bar.lock().unwrap_or_else(|p| p.into_inner()) = Some(bar);
    }

    fn on_progress(&self, run: &DispatchRun) {
        self.with_bar(|bar| {
            bar.set_position(run.sent_count as u64);
            bar.set_message(format!("{} ok", run.success_count));
        });
    }

    fn on_finish(&self, run: &DispatchRun) {
        self.with_bar(|bar| bar.finish_with_message(completion_line(run)));
    }

    fn on_abort(&self, run: &DispatchRun) {
        self.with_bar(|bar| {
            bar.abandon_with_message(format!(
                "Sending aborted after {} of {} messages",
                run.sent_count, run.total_count
            ))
        });
    }
}
