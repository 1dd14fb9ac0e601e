//! Direct-download installers: exe, msi and zip archives.
//!
//! Scratch directories created here live for one item's resolution
//! only. They are `TempDir`s, so they are removed on success, failure
//! and early return alike.

use anyhow::{Context as _, Result, anyhow, bail};
use log::{info, warn};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use super::{Resolution, tail};
use crate::context::Context;
use crate::item::Item;
use crate::paths;

/// Installer name stems recognised inside extracted archives.
const INSTALLER_STEMS: [&str; 3] = ["setup", "install", "update"];
const INSTALLER_EXTS: [&str; 2] = ["exe", "msi"];
const DEFAULT_SILENT_ARGS: &str = "/S";

pub(crate) fn install(item: &Item, ctx: &Context) -> Result<Resolution> {
    let scratch = TempDir::new().context("could not create download directory")?;

    let installer = match &item.extras.local_file {
        Some(file) => paths::expand(file),
        None => {
            let url = item
                .extras
                .download_url
                .as_deref()
                .ok_or_else(|| anyhow!("no download URL or local file configured"))?;
            let dest = scratch.path().join(file_name_from_url(url));
            ctx.fetcher
                .download(url, &dest)
                .with_context(|| format!("download of {url} failed"))?;
            dest
        }
    };

    run_installer(&installer, item, ctx)
}

/// Dispatch on the installer's extension. Unknown extensions leave the
/// item indeterminate rather than failing it.
pub(crate) fn run_installer(path: &Path, item: &Item, ctx: &Context) -> Result<Resolution> {
    match extension(path).as_deref() {
        Some("exe") => {
            run_exe(path, item, ctx)?;
            Ok(Resolution::Done("ran installer".to_string()))
        }
        Some("msi") => {
            run_msi(path, item, ctx)?;
            Ok(Resolution::Done("ran msi installer".to_string()))
        }
        Some("zip") => install_from_zip(path, item, ctx),
        other => Ok(Resolution::Indeterminate(format!(
            "unsupported installer extension '{}'",
            other.unwrap_or("none")
        ))),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn run_exe(path: &Path, item: &Item, ctx: &Context) -> Result<()> {
    let args_line = item
        .extras
        .install_args
        .as_deref()
        .unwrap_or(DEFAULT_SILENT_ARGS);
    let args: Vec<&str> = args_line.split_whitespace().collect();
    let program = path.display().to_string();
    let out = ctx.runner.run(&program, &args)?;
    if !out.success {
        bail!("installer exited with failure: {}", tail(&out));
    }
    Ok(())
}

fn run_msi(path: &Path, item: &Item, ctx: &Context) -> Result<()> {
    let mut args: Vec<String> = vec![
        "/i".to_string(),
        path.display().to_string(),
        "/qn".to_string(),
        "/norestart".to_string(),
    ];
    if let Some(extra) = &item.extras.install_args {
        args.extend(extra.split_whitespace().map(String::from));
    }
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let out = ctx.runner.run("msiexec", &refs)?;
    if !out.success {
        bail!("msiexec exited with failure: {}", tail(&out));
    }
    Ok(())
}

fn install_from_zip(archive: &Path, item: &Item, ctx: &Context) -> Result<Resolution> {
    let extracted = TempDir::new().context("could not create extraction directory")?;
    ctx.extractor
        .extract_zip(archive, extracted.path())
        .with_context(|| format!("extraction of {} failed", archive.display()))?;

    let installer = find_installer(extracted.path(), item.extras.archive_exe.as_deref())
        .ok_or_else(|| anyhow!("no common installer (setup/install/update .exe or .msi) found in archive"))?;
    info!(
        "{}: running {} from archive",
        item.key,
        installer.display()
    );
    run_installer(&installer, item, ctx)
}

/// A configured archive-internal path wins; otherwise the first file
/// whose stem looks like an installer and whose extension is runnable.
fn find_installer(root: &Path, configured: Option<&str>) -> Option<PathBuf> {
    if let Some(rel) = configured {
        let candidate = root.join(rel);
        if candidate.exists() {
            return Some(candidate);
        }
        warn!("configured archive executable {rel} not present; scanning instead");
    }

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .find(|entry| entry.file_type().is_file() && looks_like_installer(entry.path()))
        .map(walkdir::DirEntry::into_path)
}

fn looks_like_installer(path: &Path) -> bool {
    let ext_ok = extension(path).is_some_and(|ext| INSTALLER_EXTS.contains(&ext.as_str()));
    if !ext_ok {
        return false;
    }
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    INSTALLER_STEMS.iter().any(|needle| stem.contains(needle))
}

fn file_name_from_url(url: &str) -> String {
    url.rsplit('/')
        .next()
        .and_then(|name| name.split('?').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("download.bin")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CmdOutput;
    use crate::item::{DesiredState, ItemExtras, Provider};
    use crate::testutil::TestHost;

    fn download_item(url: &str) -> Item {
        Item::new("tool", Provider::Download, DesiredState::Install).with_extras(ItemExtras {
            download_url: Some(url.to_string()),
            ..ItemExtras::default()
        })
    }

    #[test]
    fn exe_download_runs_with_default_silent_args() {
        let host = TestHost::new();
        let item = download_item("https://example.com/tool-setup.exe");
        let resolution = install(&item, &host.ctx()).expect("install succeeds");
        assert!(matches!(resolution, Resolution::Done(_)));

        let downloads = host.fetcher.downloads.borrow();
        assert_eq!(downloads.len(), 1);
        assert!(downloads[0].1.ends_with("tool-setup.exe"));
        // Download target is gone after resolution.
        assert!(!downloads[0].1.exists());

        let calls = host.runner.calls_to(&downloads[0].1.display().to_string());
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, vec!["/S".to_string()]);
    }

    #[test]
    fn msi_runs_through_msiexec() {
        let host = TestHost::new();
        let item = download_item("https://example.com/tool.msi");
        install(&item, &host.ctx()).expect("install succeeds");

        let calls = host.runner.calls_to("msiexec");
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.contains(&"/qn".to_string()));
        assert!(calls[0].1.contains(&"/i".to_string()));
    }

    #[test]
    fn custom_install_args_replace_default() {
        let host = TestHost::new();
        let mut item = download_item("https://example.com/tool.exe");
        item.extras.install_args = Some("/VERYSILENT /NORESTART".to_string());
        install(&item, &host.ctx()).expect("install succeeds");

        let downloads = host.fetcher.downloads.borrow();
        let calls = host.runner.calls_to(&downloads[0].1.display().to_string());
        assert_eq!(
            calls[0].1,
            vec!["/VERYSILENT".to_string(), "/NORESTART".to_string()]
        );
    }

    #[test]
    fn zip_with_installer_recurses_into_exe_handling() {
        let host = TestHost::new();
        host.extractor.with_files(&["docs/readme.txt", "bin/setup.exe"]);
        let item = download_item("https://example.com/tool.zip");
        let resolution = install(&item, &host.ctx()).expect("install succeeds");
        assert!(matches!(resolution, Resolution::Done(_)));

        // The extracted installer was invoked...
        let dests = host.extractor.dests.borrow();
        let setup = dests[0].join("bin/setup.exe");
        assert_eq!(host.runner.calls_to(&setup.display().to_string()).len(), 1);
        // ...and the extraction directory is gone afterwards.
        assert!(!dests[0].exists());
    }

    #[test]
    fn zip_without_installer_is_an_error_and_cleans_up() {
        let host = TestHost::new();
        host.extractor
            .with_files(&["readme.txt", "data/archive.dat"]);
        let item = download_item("https://example.com/tool.zip");
        let err = install(&item, &host.ctx()).expect_err("no installer found");
        assert!(format!("{err:#}").contains("no common installer"));

        let dests = host.extractor.dests.borrow();
        assert_eq!(dests.len(), 1);
        assert!(!dests[0].exists());
    }

    #[test]
    fn configured_archive_path_wins_over_scan() {
        let host = TestHost::new();
        host.extractor
            .with_files(&["setup.exe", "nested/custom.exe"]);
        let mut item = download_item("https://example.com/tool.zip");
        item.extras.archive_exe = Some("nested/custom.exe".to_string());
        install(&item, &host.ctx()).expect("install succeeds");

        let dests = host.extractor.dests.borrow();
        let custom = dests[0].join("nested/custom.exe");
        assert_eq!(host.runner.calls_to(&custom.display().to_string()).len(), 1);
    }

    #[test]
    fn unknown_extension_is_indeterminate() {
        let host = TestHost::new();
        let item = download_item("https://example.com/tool.appimage");
        let resolution = install(&item, &host.ctx()).expect("no hard failure");
        match resolution {
            Resolution::Indeterminate(why) => assert!(why.contains("unsupported")),
            Resolution::Done(how) => panic!("unexpected done: {how}"),
        }
    }

    #[test]
    fn download_failure_is_terminal() {
        let host = TestHost::new();
        host.fetcher.fail.set(true);
        let item = download_item("https://example.com/tool.exe");
        let err = install(&item, &host.ctx()).expect_err("download fails");
        assert!(format!("{err:#}").contains("download"));

        // Nothing was executed.
        assert!(host.runner.calls.borrow().is_empty());
    }

    #[test]
    fn missing_url_and_file_is_a_config_error() {
        let host = TestHost::new();
        let item = Item::new("tool", Provider::Download, DesiredState::Install);
        let err = install(&item, &host.ctx()).expect_err("nothing to install from");
        assert!(format!("{err:#}").contains("no download URL"));
    }

    #[test]
    fn file_name_from_url_handles_queries() {
        assert_eq!(
            file_name_from_url("https://example.com/a/b/tool.exe?token=abc"),
            "tool.exe"
        );
        assert_eq!(file_name_from_url("https://example.com/"), "download.bin");
    }
}
