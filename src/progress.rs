//! Progress reporting infrastructure

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::borrow::Cow;

/// CLI progress report of ongoing operations
///
/// To avoid corrupted terminal output, you should not write anything to stdout
/// or stderr yourself as long as a report is being displayed. Please use logs
/// for debug messages, and hide the report when logs are verbose.
#[derive(Clone, Debug, Default)]
pub struct ProgressReport(MultiProgress);
//
impl ProgressReport {
    /// Prepare to report progress on the cli
    pub fn new() -> Self {
        Self::default()
    }

    /// Track progress without displaying anything
    pub fn hidden() -> Self {
        Self(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()))
    }

    /// Prepare to report on a new operation with a known number of steps
    pub fn add(&self, what: impl Into<Cow<'static, str>>, steps: usize) -> ProgressTracker {
        let bar = ProgressBar::new(steps as u64)
            .with_prefix(what)
            .with_style(
                ProgressStyle::with_template("{prefix} {wide_bar} {pos}/{len} ({msg})")
                    .expect("progress style above should be a valid indicatif style"),
            );
        ProgressTracker {
            bar: self.0.add(bar),
            report: self.0.clone(),
        }
    }
}

/// Mechanism to track progress
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    /// Progress bar for this specific process
    bar: ProgressBar,

    /// Underlying process report
    report: MultiProgress,
}
//
impl ProgressTracker {
    /// Show that a step was taken, on the given item
    pub fn make_progress(&self, item: impl Into<Cow<'static, str>>) {
        self.bar.set_message(item);
        self.bar.inc(1);
    }

    /// Hide the progress bar, whether all steps were taken or not
    pub fn finish(&self) {
        self.bar.finish_and_clear();
        self.report.remove(&self.bar);
    }
}
