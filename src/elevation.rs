//! Administrator detection.

use provision::CommandRunner;

/// `net session` succeeds only in an elevated shell, which makes it a
/// dependency-free administrator probe.
pub fn is_elevated(runner: &dyn CommandRunner) -> bool {
    runner
        .run("net", &["session"])
        .map(|out| out.success)
        .unwrap_or(false)
}
