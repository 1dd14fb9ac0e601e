//! Provider resolution engine.
//!
//! For each install item: short-circuit if the probe says it is
//! already present, otherwise dispatch to the handler for its
//! provider. Every terminal branch records exactly one outcome, and
//! nothing a handler does can escape [`resolve`] - errors become
//! Error records and the caller moves on to the next item.

pub mod choco;
pub mod manual;
pub mod release;
pub mod scoop;
pub mod store;
pub mod winget;

use anyhow::{Result, bail};
use log::{info, warn};

use crate::context::{CmdOutput, Context};
use crate::item::{Item, Provider};
use crate::probe;
use crate::tracker::{Outcome, Tracker};

/// What a resolution attempt concluded.
#[derive(Debug)]
pub(crate) enum Resolution {
    /// The item reached its desired state.
    Done(String),
    /// Nothing was attempted and the state is left as-is (unsupported
    /// installer extension and the like).
    Indeterminate(String),
}

/// Resolve one install item, recording exactly one outcome for it.
pub fn resolve(item: &Item, ctx: &Context, tracker: &mut Tracker, phase: &str) -> Outcome {
    let label = format!("{} ({} via {})", item.key, item.identifier(), item.provider);

    if probe::is_installed(item, ctx) {
        let detail = format!("{label}: already installed");
        info!("{detail}");
        tracker.record(phase, Outcome::Success, &detail);
        return Outcome::Success;
    }

    match dispatch(item, ctx) {
        Ok(Resolution::Done(how)) => {
            let detail = format!("{label}: {how}");
            info!("{detail}");
            tracker.record(phase, Outcome::Success, &detail);
            Outcome::Success
        }
        Ok(Resolution::Indeterminate(why)) => {
            let detail = format!("{label}: {why}");
            warn!("{detail}");
            tracker.record(phase, Outcome::Warning, &detail);
            Outcome::Warning
        }
        Err(err) => {
            let detail = format!("{label}: {err:#}");
            warn!("{detail}");
            tracker.record(phase, Outcome::Error, &detail);
            Outcome::Error
        }
    }
}

fn dispatch(item: &Item, ctx: &Context) -> Result<Resolution> {
    match item.provider {
        Provider::Winget => winget::install(item, ctx),
        Provider::Choco => choco::install(item, ctx),
        Provider::Scoop => scoop::install(item, ctx),
        Provider::Store => store::install(item, ctx),
        Provider::Download => manual::install(item, ctx),
        Provider::GithubRelease => release::install(item, ctx),
    }
}

/// Try candidates in order until one succeeds. Returns the label of
/// the winning candidate; fails only when the whole list is exhausted.
pub(crate) fn cascade<'a>(
    candidates: impl IntoIterator<Item = (&'a str, Box<dyn FnOnce() -> Result<()> + 'a>)>,
) -> Result<&'a str> {
    let mut failures: Vec<String> = Vec::new();
    for (label, attempt) in candidates {
        match attempt() {
            Ok(()) => return Ok(label),
            Err(err) => {
                warn!("{label} failed: {err:#}");
                failures.push(format!("{label}: {err:#}"));
            }
        }
    }
    bail!("all methods failed ({})", failures.join("; "))
}

/// Last non-empty output line, for error details.
pub(crate) fn tail(out: &CmdOutput) -> String {
    let text = if out.stderr.trim().is_empty() {
        &out.stdout
    } else {
        &out.stderr
    };
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("(no output)")
        .trim()
        .to_string()
}
