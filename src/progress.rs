//! indicatif-backed progress for phase runs.

use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;

use provision::{Outcome, Progress};

/// One bar per phase, replaced as phases come and go.
pub struct BarProgress {
    bar: RefCell<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }
}

impl Progress for BarProgress {
    fn phase_start(&self, phase: &str, total: usize) {
        if total == 0 {
            return;
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("  {bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(phase.to_string());
        *self.bar.borrow_mut() = Some(bar);
    }

    fn item_done(&self, _phase: &str, key: &str, outcome: Outcome) {
        if let Some(bar) = self.bar.borrow().as_ref() {
            let symbol = match outcome {
                Outcome::Success => "✓",
                Outcome::Warning => "⚠",
                Outcome::Error => "✗",
            };
            bar.set_message(format!("{symbol} {key}"));
            bar.inc(1);
        }
    }

    fn phase_done(&self, _phase: &str) {
        if let Some(bar) = self.bar.borrow_mut().take() {
            bar.finish_and_clear();
        }
    }
}
