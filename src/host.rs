//! Real implementations of the engine's host-side collaborators.

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;

use provision::{AssetInfo, Extractor, Fetcher, ReleaseInfo, ReleaseSource};

/// Downloads through the shared ghrel HTTP client.
pub struct HttpFetcher {
    client: ghrel::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: ghrel::Client::new(),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.client.download(url, dest)?;
        Ok(())
    }
}

/// zip-backed archive extraction.
pub struct ZipExtractor;

impl Extractor for ZipExtractor {
    fn extract_zip(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = fs::File::open(archive)
            .with_context(|| format!("could not open {}", archive.display()))?;
        let mut zip = zip::ZipArchive::new(file).context("could not read zip archive")?;
        zip.extract(dest).context("could not extract zip archive")?;
        Ok(())
    }
}

/// GitHub releases adapter for the engine's ReleaseSource seam.
pub struct GithubReleases {
    client: ghrel::Client,
}

impl GithubReleases {
    pub fn new() -> Self {
        Self {
            client: ghrel::Client::new(),
        }
    }
}

impl ReleaseSource for GithubReleases {
    fn latest_release(&self, repo: &str) -> Result<ReleaseInfo> {
        let release = self.client.latest_release(repo)?;
        Ok(ReleaseInfo {
            tag: release.tag,
            assets: release
                .assets
                .into_iter()
                .map(|asset| AssetInfo {
                    name: asset.name,
                    download_url: asset.download_url,
                    created_at: asset.created_at,
                })
                .collect(),
        })
    }
}
