//! Nerd Fonts: a three-method cascade with fuzzy presence detection.
//!
//! Methods are tried in order - Chocolatey bulk install, Scoop with
//! the nerd-fonts bucket, then direct GitHub download per font - and
//! the cascade stops as soon as every requested font is present. A
//! final reconciliation pass re-checks each font and records an Error
//! for any still missing.

use anyhow::{Context as _, Result, bail};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::context::Context;
use crate::install::{scoop, tail};
use crate::tracker::{Outcome, Tracker};

/// Release repository backing the direct-download method.
const NERD_FONTS_REPO: &str = "ryanoasis/nerd-fonts";
const FONTS_BUCKET: &str = "nerd-fonts";
const FONT_EXTS: [&str; 2] = ["ttf", "otf"];
const FONT_REGISTRY_KEY: &str = r"HKLM\SOFTWARE\Microsoft\Windows NT\CurrentVersion\Fonts";

/// Requested Nerd Fonts for one run.
#[derive(Debug, Clone, Default)]
pub struct FontRequest {
    pub fonts: Vec<String>,
}

type MethodFn = fn(&[String], &Context) -> Result<()>;

/// Ordered method list; each entry only sees the fonts still missing
/// when its turn comes.
const METHODS: [(&str, MethodFn); 3] = [
    ("chocolatey", choco_bulk),
    ("scoop", scoop_bulk),
    ("github", github_direct),
];

pub(crate) fn install_all(request: &FontRequest, ctx: &Context, tracker: &mut Tracker, phase: &str) {
    if request.fonts.is_empty() {
        return;
    }

    for (label, method) in METHODS {
        let missing = missing_fonts(&request.fonts, ctx);
        if missing.is_empty() {
            break;
        }
        debug!("{} font(s) missing, trying {label}", missing.len());
        if let Err(err) = method(&missing, ctx) {
            warn!("{label} font install failed: {err:#}");
        }
    }

    // Reconciliation: every requested font is re-checked once more.
    for font in &request.fonts {
        let outcome = if font_installed(font, ctx) {
            tracker.record(phase, Outcome::Success, &format!("font {font} present"));
            Outcome::Success
        } else {
            tracker.record(
                phase,
                Outcome::Error,
                &format!("font {font} still missing after all install methods"),
            );
            Outcome::Error
        };
        ctx.progress.item_done(phase, font, outcome);
    }
}

/// Whitespace-stripped substring containment, checked first against
/// files in the font directory, then against font registry entries
/// (both the value names and the stored file names).
pub fn font_installed(font: &str, ctx: &Context) -> bool {
    let needle = normalize(font);
    if needle.is_empty() {
        return false;
    }

    if let Ok(entries) = fs::read_dir(&ctx.font_dir) {
        for entry in entries.filter_map(std::result::Result::ok) {
            if normalize(&entry.file_name().to_string_lossy()).contains(&needle) {
                return true;
            }
        }
    }

    match ctx.runner.run("reg", &["query", FONT_REGISTRY_KEY]) {
        Ok(out) if out.success => out
            .stdout
            .lines()
            .any(|line| normalize(line).contains(&needle)),
        _ => false,
    }
}

fn missing_fonts(fonts: &[String], ctx: &Context) -> Vec<String> {
    fonts
        .iter()
        .filter(|font| !font_installed(font, ctx))
        .cloned()
        .collect()
}

fn normalize(name: &str) -> String {
    name.split_whitespace().collect::<String>().to_ascii_lowercase()
}

/// One choco invocation installs the whole batch.
fn choco_bulk(fonts: &[String], ctx: &Context) -> Result<()> {
    let mut args: Vec<String> = vec!["install".to_string()];
    args.extend(
        fonts
            .iter()
            .map(|font| format!("nerd-fonts-{}", normalize(font))),
    );
    args.push("--yes".to_string());
    args.push("--no-progress".to_string());

    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let out = ctx.runner.run("choco", &refs)?;
    if !out.success {
        bail!("choco font install failed: {}", tail(&out));
    }
    Ok(())
}

/// Registers the nerd-fonts bucket (non-fatal), then bulk installs.
fn scoop_bulk(fonts: &[String], ctx: &Context) -> Result<()> {
    scoop::ensure_bucket(FONTS_BUCKET, ctx);

    let mut args: Vec<String> = vec!["install".to_string()];
    args.extend(
        fonts
            .iter()
            .map(|font| format!("{FONTS_BUCKET}/{}", normalize(font))),
    );

    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let out = ctx.runner.run("scoop", &refs)?;
    if !out.success {
        bail!("scoop font install failed: {}", tail(&out));
    }
    Ok(())
}

/// Per font: download the release zip, extract it, copy every font
/// file into the system font directory. A failure for one font does
/// not stop the others.
fn github_direct(fonts: &[String], ctx: &Context) -> Result<()> {
    for font in fonts {
        if let Err(err) = github_one(font, ctx) {
            warn!("{font}: direct download failed: {err:#}");
        }
    }
    Ok(())
}

fn github_one(font: &str, ctx: &Context) -> Result<()> {
    let scratch = TempDir::new().context("could not create font download directory")?;
    let archive_name = format!("{}.zip", normalize_release_name(font));
    let url = format!(
        "https://github.com/{NERD_FONTS_REPO}/releases/latest/download/{archive_name}"
    );

    let archive = scratch.path().join(&archive_name);
    ctx.fetcher.download(&url, &archive)?;

    let extracted = scratch.path().join("extracted");
    fs::create_dir_all(&extracted)?;
    ctx.extractor.extract_zip(&archive, &extracted)?;

    copy_font_files(&extracted, ctx)
}

/// Release archives are named without spaces ("JetBrains Mono" ships
/// as JetBrainsMono.zip).
fn normalize_release_name(font: &str) -> String {
    font.split_whitespace().collect()
}

fn copy_font_files(dir: &Path, ctx: &Context) -> Result<()> {
    let mut copied = 0usize;
    for entry in WalkDir::new(dir).into_iter().filter_map(std::result::Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.path().file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let is_font = entry
            .path()
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| FONT_EXTS.contains(&ext.as_str()));
        if !is_font {
            continue;
        }

        let target = ctx.font_dir.join(name);
        if target.exists() {
            debug!("{name}: already in font directory, skipping");
            continue;
        }
        fs::copy(entry.path(), &target)
            .with_context(|| format!("could not copy {name} into the font directory"))?;
        copied += 1;
    }
    info!("copied {copied} font file(s) into {}", ctx.font_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CmdOutput, CommandRunner};
    use crate::testutil::TestHost;
    use std::cell::Cell;

    fn request(fonts: &[&str]) -> FontRequest {
        FontRequest {
            fonts: fonts.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn present_font_skips_every_method() {
        let host = TestHost::new();
        std::fs::write(
            host.font_dir_path().join("FiraCodeNerdFont-Regular.ttf"),
            b"font",
        )
        .expect("seed font file");

        let mut tracker = Tracker::new();
        tracker.init_phase("fonts");
        install_all(&request(&["Fira Code"]), &host.ctx(), &mut tracker, "fonts");

        assert!(host.runner.calls_to("choco").is_empty());
        assert!(host.runner.calls_to("scoop").is_empty());
        assert!(host.fetcher.downloads.borrow().is_empty());

        let stats = tracker.phase("fonts").expect("phase exists");
        assert_eq!(stats.succeeded, 1);
    }

    #[test]
    fn registry_entries_count_as_installed() {
        let host = TestHost::new();
        host.runner.on(
            "reg",
            "query",
            CmdOutput::ok(
                "HKEY_LOCAL_MACHINE\\...\\Fonts\n    JetBrainsMono NF (TrueType)    REG_SZ    JetBrainsMonoNerdFont-Regular.ttf",
            ),
        );
        assert!(font_installed("JetBrains Mono", &host.ctx()));
    }

    /// Runner that reports the font as registered only after a choco
    /// install ran, so the cascade stops after its first method.
    struct ChocoThenRegistered {
        inner: crate::testutil::MockRunner,
        choco_ran: Cell<bool>,
    }

    impl CommandRunner for ChocoThenRegistered {
        fn run(&self, program: &str, args: &[&str]) -> Result<CmdOutput> {
            if program == "choco" {
                self.choco_ran.set(true);
                self.inner.run(program, args)?;
                return Ok(CmdOutput::ok("installed"));
            }
            if program == "reg" && self.choco_ran.get() {
                return Ok(CmdOutput::ok("FiraCode Nerd Font (TrueType) REG_SZ FiraCode.ttf"));
            }
            self.inner.run(program, args)
        }

        fn command_exists(&self, _program: &str) -> bool {
            true
        }
    }

    #[test]
    fn cascade_stops_after_first_successful_method() {
        let host = TestHost::new();
        let runner = ChocoThenRegistered {
            inner: crate::testutil::MockRunner::new(),
            choco_ran: Cell::new(false),
        };
        let mut ctx = host.ctx();
        ctx.runner = &runner;

        let mut tracker = Tracker::new();
        tracker.init_phase("fonts");
        install_all(&request(&["FiraCode"]), &ctx, &mut tracker, "fonts");

        // choco ran, but neither scoop nor the GitHub download did.
        assert!(runner.choco_ran.get());
        assert!(runner.inner.calls_to("scoop").is_empty());
        assert!(host.fetcher.downloads.borrow().is_empty());

        let stats = tracker.phase("fonts").expect("phase exists");
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed, 0);
    }

    #[test]
    fn github_method_copies_font_files() {
        let host = TestHost::new();
        // choco and scoop both fail, forcing the direct download.
        host.runner.on_any("choco", CmdOutput::fail("no such package"));
        host.runner.on_any("scoop", CmdOutput::fail("no bucket"));
        host.extractor
            .with_files(&["FiraCodeNerdFont-Regular.ttf", "readme.md", "LICENSE"]);

        let mut tracker = Tracker::new();
        tracker.init_phase("fonts");
        install_all(&request(&["Fira Code"]), &host.ctx(), &mut tracker, "fonts");

        let downloads = host.fetcher.downloads.borrow();
        assert_eq!(downloads.len(), 1);
        assert!(downloads[0].0.ends_with("FiraCode.zip"));

        // Only the .ttf landed in the font dir, and the run reconciled
        // to success.
        assert!(host.font_dir_path().join("FiraCodeNerdFont-Regular.ttf").exists());
        assert!(!host.font_dir_path().join("readme.md").exists());
        let stats = tracker.phase("fonts").expect("phase exists");
        assert_eq!(stats.succeeded, 1);
    }

    #[test]
    fn missing_font_after_all_methods_is_an_error() {
        let host = TestHost::new();
        host.runner.on_any("choco", CmdOutput::fail("no such package"));
        host.runner.on_any("scoop", CmdOutput::fail("no bucket"));
        host.fetcher.fail.set(true);

        let mut tracker = Tracker::new();
        tracker.init_phase("fonts");
        install_all(&request(&["Hack"]), &host.ctx(), &mut tracker, "fonts");

        let stats = tracker.phase("fonts").expect("phase exists");
        assert_eq!(stats.failed, 1);
        assert!(stats.details.last().expect("detail").1.contains("still missing"));
    }

    #[test]
    fn normalize_strips_whitespace_and_case() {
        assert_eq!(normalize("Fira Code"), "firacode");
        assert_eq!(normalize("  JetBrains  Mono "), "jetbrainsmono");
    }
}
