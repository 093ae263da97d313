use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Buffer of the progress broadcast channel; slow receivers see `Lagged`.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 256;

/// Target number of persisted progress updates per run.
pub const PROGRESS_UPDATES_PER_RUN: usize = 20;

const BAR_TEMPLATE: &str =
    "{msg} [{bar:40.cyan/blue}] {percent}% | ETA: {eta} | {pos}/{len} items";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvalProgress {
    pub completed: usize,
    pub total: usize,
}

impl EvalProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}

/// Number of completions between persisted progress updates.
pub fn progress_interval(total: usize) -> usize {
    (total / PROGRESS_UPDATES_PER_RUN).max(1)
}

/// Whether `completed` of `total` is a point at which progress is persisted.
/// The final completion always is.
pub fn is_progress_checkpoint(completed: usize, total: usize) -> bool {
    completed == total || completed % progress_interval(total) == 0
}

/// Reports completions of one run to the terminal and to subscribers.
pub struct ProgressReporter {
    total: usize,
    bar: Option<ProgressBar>,
    sender: broadcast::Sender<EvalProgress>,
}

impl ProgressReporter {
    /// Starts reporting at 0 of `total`.
    pub fn start(
        name: &str,
        total: usize,
        show_bar: bool,
        sender: broadcast::Sender<EvalProgress>,
    ) -> Self {
        let bar = show_bar.then(|| {
            let bar = ProgressBar::new(total as u64);
            match ProgressStyle::default_bar().template(BAR_TEMPLATE) {
                Ok(style) => bar.set_style(style.progress_chars("█░ ")),
                Err(e) => tracing::warn!(error = %e, "Invalid progress bar template"),
            }
            bar.set_message(name.to_string());
            bar
        });

        let reporter = Self { total, bar, sender };
        reporter.publish(0);
        reporter
    }

    pub fn update(&self, completed: usize) {
        if let Some(bar) = &self.bar {
            bar.set_position(completed as u64);
        }
        self.publish(completed);
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish();
        }
    }

    /// Leave the bar where it stopped.
    pub fn abandon(&self) {
        if let Some(bar) = &self.bar {
            bar.abandon();
        }
    }

    fn publish(&self, completed: usize) {
        // No receivers is fine.
        let _ = self.sender.send(EvalProgress {
            completed,
            total: self.total,
        });
    }
}
