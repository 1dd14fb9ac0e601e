//! # ghrel
//!
//! Minimal blocking GitHub Releases client.
//!
//! Fetches latest-release metadata and downloads release assets to
//! local files, with a body-size limit and a fixed global timeout.
//!
//! ```no_run
//! use ghrel::Client;
//!
//! let client = Client::new();
//! let release = client.latest_release("ryanoasis/nerd-fonts").unwrap();
//! println!("{} has {} assets", release.tag, release.assets.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::{Error, Result};

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Maximum download size (installers can be large, but not unbounded).
const MAX_BODY_SIZE: u64 = 500 * 1024 * 1024;

/// Global request timeout. Generous because release assets are
/// downloaded over this client too.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

const USER_AGENT: &str = "winsetup";

/// A release with its downloadable assets.
#[derive(Debug, Clone)]
pub struct Release {
    /// Release tag, e.g. `v3.1.1`.
    pub tag: String,
    /// Display name, falling back to the tag.
    pub name: String,
    /// Whether the release is marked as a prerelease.
    pub prerelease: bool,
    /// Downloadable assets attached to the release.
    pub assets: Vec<Asset>,
}

/// A single downloadable file in a release.
#[derive(Debug, Clone)]
pub struct Asset {
    /// File name, e.g. `tool-setup.exe`.
    pub name: String,
    /// Direct download URL (works unauthenticated for public repos).
    pub download_url: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Size in bytes.
    pub size: u64,
}

/// Blocking GitHub Releases client.
pub struct Client {
    agent: ureq::Agent,
    api_base: String,
}

impl Client {
    /// Create a client against the public GitHub API.
    #[must_use]
    pub fn new() -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();
        Self {
            agent,
            api_base: "https://api.github.com".to_string(),
        }
    }

    /// Create a client with a custom API base (for testing).
    #[must_use]
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        let mut client = Self::new();
        client.api_base = api_base.into();
        client
    }

    /// Get the current API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build the API URL for the latest release of `repo`.
    fn latest_url(&self, repo: &str) -> String {
        format!("{}/repos/{repo}/releases/latest", self.api_base)
    }

    /// Fetch the latest (non-draft, non-prerelease) release of
    /// `owner/name`.
    pub fn latest_release(&self, repo: &str) -> Result<Release> {
        if !valid_repo(repo) {
            return Err(Error::InvalidRepo(repo.to_string()));
        }

        let release: ApiRelease = self
            .agent
            .get(&self.latest_url(repo))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .call()?
            .body_mut()
            .read_json()?;

        Ok(release.into())
    }

    /// Download `url` to `dest`, streaming to disk. Returns the number
    /// of bytes written.
    pub fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self
            .agent
            .get(url)
            .header("Accept", "application/octet-stream")
            .header("User-Agent", USER_AGENT)
            .call()?;

        let mut reader = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_SIZE)
            .reader();
        let mut file = fs::File::create(dest).map_err(|err| Error::io(dest, err))?;

        std::io::copy(&mut reader, &mut file).map_err(|err| Error::DownloadFailed {
            url: url.to_string(),
            message: err.to_string(),
        })
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip a leading `v` when comparing release tags to crate versions.
#[must_use]
pub fn normalize_tag(tag: &str) -> &str {
    tag.trim_start_matches(['v', 'V'])
}

fn valid_repo(repo: &str) -> bool {
    let mut parts = repo.split('/');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
    )
}

// =============================================================================
// GitHub API response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiRelease {
    tag_name: String,
    name: Option<String>,
    prerelease: bool,
    assets: Vec<ApiAsset>,
}

#[derive(Debug, Deserialize)]
struct ApiAsset {
    name: String,
    browser_download_url: String,
    created_at: Option<String>,
    size: u64,
}

impl From<ApiRelease> for Release {
    fn from(release: ApiRelease) -> Self {
        Self {
            tag: release.tag_name.clone(),
            name: release.name.unwrap_or(release.tag_name),
            prerelease: release.prerelease,
            assets: release.assets.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ApiAsset> for Asset {
    fn from(asset: ApiAsset) -> Self {
        Self {
            name: asset.name,
            download_url: asset.browser_download_url,
            created_at: asset.created_at.unwrap_or_default(),
            size: asset.size,
        }
    }
}
