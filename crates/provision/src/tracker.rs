//! Per-phase outcome bookkeeping.
//!
//! The tracker is an explicit state object: phases create it and pass
//! it by reference, and the caller reads it once at the end of a run
//! to render the summary. Pure bookkeeping - nothing here fails.

use log::debug;
use std::fmt::Write as _;

/// Kind of a recorded outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Nothing was attempted or state is indeterminate - distinguished
    /// from `Error` because no corrective action failed.
    Warning,
    Error,
}

impl Outcome {
    fn tag(self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Warning => "WARN",
            Self::Error => "FAIL",
        }
    }
}

/// Counters and detail log for one named phase.
///
/// Invariant: `attempted == succeeded + failed` (warnings do not count
/// as attempts).
#[derive(Debug, Clone, Default)]
pub struct PhaseStats {
    pub attempted: usize,
    pub succeeded: usize,
    pub warned: usize,
    pub failed: usize,
    /// Ordered human-readable outcome details, tagged with their kind.
    pub details: Vec<(Outcome, String)>,
}

impl PhaseStats {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Outcome tracker shared by all phases of a run.
#[derive(Debug, Default)]
pub struct Tracker {
    phases: Vec<(String, PhaseStats)>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or reset the bucket for `phase`. Resetting mid-run
    /// discards earlier counts - intentional reset semantics, relied
    /// on when a phase is re-run.
    pub fn init_phase(&mut self, phase: &str) {
        match self.phases.iter_mut().find(|(name, _)| name == phase) {
            Some(slot) => slot.1 = PhaseStats::default(),
            None => self.phases.push((phase.to_string(), PhaseStats::default())),
        }
    }

    /// Record `amount` outcomes of `kind` for `phase`, with an
    /// optional detail line. A phase that was never initialized is
    /// created on the spot.
    pub fn record_many(&mut self, phase: &str, kind: Outcome, amount: usize, detail: Option<&str>) {
        let index = match self.phases.iter().position(|(name, _)| name == phase) {
            Some(index) => index,
            None => {
                debug!("phase '{phase}' was never initialized; creating it on first record");
                self.phases.push((phase.to_string(), PhaseStats::default()));
                self.phases.len() - 1
            }
        };
        let stats = &mut self.phases[index].1;

        match kind {
            Outcome::Success => stats.succeeded += amount,
            Outcome::Warning => stats.warned += amount,
            Outcome::Error => stats.failed += amount,
        }
        if kind != Outcome::Warning {
            stats.attempted += amount;
        }
        if let Some(detail) = detail
            && !detail.is_empty()
        {
            stats.details.push((kind, detail.to_string()));
        }
    }

    /// Record a single outcome with a detail line.
    pub fn record(&mut self, phase: &str, kind: Outcome, detail: &str) {
        self.record_many(phase, kind, 1, Some(detail));
    }

    pub fn success(&mut self, phase: &str, detail: &str) {
        self.record(phase, Outcome::Success, detail);
    }

    pub fn warning(&mut self, phase: &str, detail: &str) {
        self.record(phase, Outcome::Warning, detail);
    }

    pub fn error(&mut self, phase: &str, detail: &str) {
        self.record(phase, Outcome::Error, detail);
    }

    /// Stats for one phase, if it exists.
    pub fn phase(&self, name: &str) -> Option<&PhaseStats> {
        self.phases
            .iter()
            .find(|(phase, _)| phase == name)
            .map(|(_, stats)| stats)
    }

    /// All phases in creation order.
    pub fn phases(&self) -> impl Iterator<Item = (&str, &PhaseStats)> {
        self.phases
            .iter()
            .map(|(name, stats)| (name.as_str(), stats))
    }

    /// Total failures across every phase.
    pub fn total_failed(&self) -> usize {
        self.phases.iter().map(|(_, stats)| stats.failed).sum()
    }

    /// Render the end-of-run report. Detail lines are included only in
    /// verbose mode.
    pub fn render(&self, verbose: bool) -> String {
        let mut out = String::new();
        for (name, stats) in &self.phases {
            let _ = writeln!(
                out,
                "{name}: {} attempted, {} succeeded, {} warned, {} failed",
                stats.attempted, stats.succeeded, stats.warned, stats.failed
            );
            if verbose {
                for (kind, detail) in &stats.details {
                    let _ = writeln!(out, "  [{}] {detail}", kind.tag());
                }
            }
        }
        out
    }
}
