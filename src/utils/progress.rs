//! Progress bar over the (rule × window) query grid.
//!
//! Thin wrapper around indicatif so commands share one style and can print
//! above the bar without tearing it.

use indicatif::{ProgressBar as IndicatifBar, ProgressDrawTarget, ProgressStyle};

pub struct ProgressBar {
    bar: IndicatifBar,
}

impl ProgressBar {
    /// Create a bar for `total` steps labelled with `label`.
    pub fn new(total: usize, label: &str) -> Self {
        let bar = IndicatifBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed_precise})")
        {
            bar.set_style(style.progress_chars("█░"));
        }
        bar.set_message(label.to_string());

        Self { bar }
    }

    /// A bar that draws nothing; used when output is not a terminal or in tests.
    pub fn hidden(total: usize) -> Self {
        let bar = IndicatifBar::with_draw_target(Some(total as u64), ProgressDrawTarget::hidden());
        Self { bar }
    }

    /// Replace the label, e.g. with the rule currently being queried.
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Advance by one completed pair.
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Print a message above the progress bar without disturbing it
    pub fn println<S: AsRef<str>>(&self, msg: S) {
        self.bar.println(msg.as_ref());
    }
}
