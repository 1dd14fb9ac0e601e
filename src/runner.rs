//! Real process invoker behind the engine's CommandRunner seam.

use anyhow::{Context as _, Result};
use std::process::{Command, Stdio};

use provision::{CmdOutput, CommandRunner};

/// Runs commands through std::process and captures their output.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CmdOutput> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program} {}", args.join(" ")))?;

        Ok(CmdOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn command_exists(&self, program: &str) -> bool {
        let locator = if cfg!(windows) { "where" } else { "which" };
        Command::new(locator)
            .arg(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}
