//! GitHub release assets: select by pattern, download, install.

use anyhow::{Context as _, Result, anyhow};
use regex::Regex;
use tempfile::TempDir;

use super::{Resolution, manual};
use crate::context::{AssetInfo, Context};
use crate::item::Item;

/// Aliases selecting the newest asset of a kind by creation time.
const NEWEST_EXE: &str = "latest.exe";
const NEWEST_MSI: &str = "latest.msi";

pub(crate) fn install(item: &Item, ctx: &Context) -> Result<Resolution> {
    // Both fields are validated before any network call is made.
    let repo = item
        .extras
        .repo
        .as_deref()
        .ok_or_else(|| anyhow!("no GitHub repository configured"))?;
    let pattern = item
        .extras
        .asset_pattern
        .as_deref()
        .ok_or_else(|| anyhow!("no asset name pattern configured"))?;

    let release = ctx
        .releases
        .latest_release(repo)
        .with_context(|| format!("could not query the latest release of {repo}"))?;
    let asset = select_asset(&release.assets, pattern)?
        .ok_or_else(|| anyhow!("no asset matching '{pattern}' in {repo} {}", release.tag))?;

    let scratch = TempDir::new().context("could not create download directory")?;
    let dest = scratch.path().join(&asset.name);
    ctx.fetcher
        .download(&asset.download_url, &dest)
        .with_context(|| format!("download of {} failed", asset.name))?;

    manual::run_installer(&dest, item, ctx)
    // scratch (and the downloaded asset with it) is removed here on
    // every path
}

/// `latest.exe` / `latest.msi` pick the newest asset with that
/// extension; anything else is a literal wildcard match.
pub(crate) fn select_asset<'a>(
    assets: &'a [AssetInfo],
    pattern: &str,
) -> Result<Option<&'a AssetInfo>> {
    Ok(match pattern {
        NEWEST_EXE => newest_with_ext(assets, ".exe"),
        NEWEST_MSI => newest_with_ext(assets, ".msi"),
        _ => {
            let re = wildcard_regex(pattern)?;
            assets.iter().find(|asset| re.is_match(&asset.name))
        }
    })
}

fn newest_with_ext<'a>(assets: &'a [AssetInfo], ext: &str) -> Option<&'a AssetInfo> {
    assets
        .iter()
        .filter(|asset| asset.name.to_ascii_lowercase().ends_with(ext))
        // RFC 3339 timestamps order lexicographically
        .max_by(|a, b| a.created_at.cmp(&b.created_at))
}

/// Translate `*`/`?` wildcards into an anchored case-insensitive regex.
fn wildcard_regex(pattern: &str) -> Result<Regex> {
    let mut expr = String::from("(?i)^");
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).context("invalid asset pattern")
}
