//! Collaborator seams between the engine and the host system.
//!
//! Every external effect goes through one of these traits so the
//! engine can be exercised against recording fakes in tests. The
//! binary supplies the real implementations.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::item::Provider;
use crate::tracker::Outcome;

/// Captured result of one external command.
#[derive(Debug, Clone, Default)]
pub struct CmdOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    /// A successful invocation with the given stdout.
    pub fn ok(stdout: &str) -> Self {
        Self {
            success: true,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    /// A failed invocation with the given stderr.
    pub fn fail(stderr: &str) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

/// Runs external commands and captures their output.
pub trait CommandRunner {
    /// `Err` means the process could not be spawned at all (tool
    /// absent); a command that ran but failed returns `Ok` with
    /// `success == false`.
    fn run(&self, program: &str, args: &[&str]) -> Result<CmdOutput>;

    /// Whether `program` resolves on PATH.
    fn command_exists(&self, program: &str) -> bool;
}

/// Downloads a URL to a local file.
pub trait Fetcher {
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Expands a zip archive into a directory.
pub trait Extractor {
    fn extract_zip(&self, archive: &Path, dest: &Path) -> Result<()>;
}

/// Default-install-location lookup for winget items with the `Auto`
/// location policy.
pub trait ManifestSource {
    fn default_install_location(&self, identifier: &str) -> Option<PathBuf>;
}

/// Release metadata, already reduced to what the engine needs.
#[derive(Debug, Clone, Default)]
pub struct ReleaseInfo {
    pub tag: String,
    pub assets: Vec<AssetInfo>,
}

#[derive(Debug, Clone)]
pub struct AssetInfo {
    pub name: String,
    pub download_url: String,
    /// RFC 3339 creation timestamp; lexicographic order is
    /// chronological order.
    pub created_at: String,
}

/// Latest-release metadata for a GitHub `owner/repo`.
pub trait ReleaseSource {
    fn latest_release(&self, repo: &str) -> Result<ReleaseInfo>;
}

/// Ensures a provider's tooling is present before its bucket of items
/// is processed. Called once per provider group per phase.
pub trait Bootstrap {
    fn ensure(&self, provider: Provider) -> bool;
}

/// Phase and item progress notifications for the UI layer.
pub trait Progress {
    fn phase_start(&self, _phase: &str, _total: usize) {}
    fn item_done(&self, _phase: &str, _key: &str, _outcome: Outcome) {}
    fn phase_done(&self, _phase: &str) {}
}

/// No-op progress sink.
pub struct NoProgress;

impl Progress for NoProgress {}

/// Borrowed bundle of every collaborator the engine needs.
pub struct Context<'a> {
    pub runner: &'a dyn CommandRunner,
    pub fetcher: &'a dyn Fetcher,
    pub extractor: &'a dyn Extractor,
    pub manifest: &'a dyn ManifestSource,
    pub releases: &'a dyn ReleaseSource,
    pub bootstrap: &'a dyn Bootstrap,
    pub progress: &'a dyn Progress,
    /// System font directory (overridable in tests).
    pub font_dir: PathBuf,
}
