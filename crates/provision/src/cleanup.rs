//! Cleanup phase: best-effort temp purge and recycle-bin clear.
//!
//! Everything here runs through PowerShell so the engine itself never
//! deletes files, and nothing is retried - a step that cannot clean is
//! a Warning, not an Error.

use crate::context::Context;
use crate::tracker::{Outcome, Tracker};

const USER_TEMP_PURGE: &str =
    "Remove-Item -Path \"$env:TEMP\\*\" -Recurse -Force -ErrorAction SilentlyContinue";
const SYSTEM_TEMP_PURGE: &str =
    "Remove-Item -Path \"$env:SystemRoot\\Temp\\*\" -Recurse -Force -ErrorAction SilentlyContinue";
const RECYCLE_BIN_CLEAR: &str = "Clear-RecycleBin -Force -ErrorAction SilentlyContinue";

pub(crate) fn run_all(ctx: &Context, tracker: &mut Tracker, phase: &str) {
    let steps: [(&str, &str); 3] = [
        ("user temp folder", USER_TEMP_PURGE),
        ("system temp folder", SYSTEM_TEMP_PURGE),
        ("recycle bin", RECYCLE_BIN_CLEAR),
    ];

    for (label, script) in steps {
        let result = ctx.runner.run(
            "powershell",
            &["-NoProfile", "-NonInteractive", "-Command", script],
        );
        match result {
            Ok(out) if out.success => {
                tracker.record(phase, Outcome::Success, &format!("cleared {label}"));
            }
            Ok(_) | Err(_) => {
                tracker.record(phase, Outcome::Warning, &format!("could not clear {label}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CmdOutput;
    use crate::testutil::TestHost;

    #[test]
    fn all_steps_succeed() {
        let host = TestHost::new();
        let mut tracker = Tracker::new();
        tracker.init_phase("cleanup");
        run_all(&host.ctx(), &mut tracker, "cleanup");

        let stats = tracker.phase("cleanup").expect("phase exists");
        assert_eq!(stats.succeeded, 3);
        assert_eq!(host.runner.calls_to("powershell").len(), 3);
    }

    #[test]
    fn failures_are_warnings_not_errors() {
        let host = TestHost::new();
        host.runner
            .on("powershell", "Clear-RecycleBin", CmdOutput::fail("in use"));

        let mut tracker = Tracker::new();
        tracker.init_phase("cleanup");
        run_all(&host.ctx(), &mut tracker, "cleanup");

        let stats = tracker.phase("cleanup").expect("phase exists");
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.warned, 1);
        assert_eq!(stats.failed, 0);
    }
}
