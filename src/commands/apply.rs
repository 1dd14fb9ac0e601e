//! Apply command - run the configured provisioning phases.

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::Context as AppContext;
use crate::bootstrap::ProviderBootstrap;
use crate::cli::ApplyArgs;
use crate::config;
use crate::elevation;
use crate::host::{GithubReleases, HttpFetcher, ZipExtractor};
use crate::manifest::FileManifest;
use crate::progress::BarProgress;
use crate::runner::ShellRunner;
use crate::ui;
use provision::dispatch::{self, RunOptions};
use provision::{Context, Tracker};

/// Where installed fonts land.
const SYSTEM_FONT_DIR: &str = "C:\\Windows\\Fonts";

pub fn run(app: &AppContext, args: ApplyArgs) -> Result<()> {
    let path = config::locate(app.config.as_deref())?;
    let cfg = config::load(&path)?;

    let runner = ShellRunner;
    if !args.dry_run && !elevation::is_elevated(&runner) {
        ui::warn("not running as administrator - installs and removals may fail");
    }

    let (apps, app_errors) = cfg.app_items();
    let (debloat, debloat_errors) = cfg.debloat_items();
    let fonts = cfg.fonts.to_request();

    let selected = |phase: &str| args.phase.is_empty() || args.phase.iter().any(|p| p == phase);
    let run_debloat = cfg.phases.debloat && selected(dispatch::DEBLOAT_PHASE);
    let run_fonts = cfg.phases.fonts && selected(dispatch::FONTS_PHASE);
    let run_apps = cfg.phases.apps && selected(dispatch::APPS_PHASE);
    let run_cleanup = cfg.phases.cleanup && selected(dispatch::CLEANUP_PHASE);

    // Show what this run covers before asking for confirmation.
    println!(
        "  {} to remove, {} fonts, {} to install{}",
        debloat.len().to_string().bold(),
        fonts.fonts.len().to_string().bold(),
        apps.len().to_string().bold(),
        if run_cleanup { ", plus cleanup" } else { "" }
    );

    if !args.yes && !args.dry_run && !confirm_proceed()? {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(());
    }

    let fetcher = HttpFetcher::new();
    let extractor = ZipExtractor;
    let manifest = FileManifest::load(&path);
    let releases = GithubReleases::new();
    let bootstrap = ProviderBootstrap::new(&runner);
    let progress = BarProgress::new();

    let ctx = Context {
        runner: &runner,
        fetcher: &fetcher,
        extractor: &extractor,
        manifest: &manifest,
        releases: &releases,
        bootstrap: &bootstrap,
        progress: &progress,
        font_dir: PathBuf::from(SYSTEM_FONT_DIR),
    };

    let opts = RunOptions {
        dry_run: args.dry_run,
    };
    let mut tracker = Tracker::new();

    if run_debloat {
        ui::section("Debloat");
        dispatch::run_removal_phase(&debloat, &ctx, &mut tracker, opts);
        for (name, err) in &debloat_errors {
            tracker.error(dispatch::DEBLOAT_PHASE, &format!("{name}: {err}"));
        }
    }

    if run_fonts {
        ui::section("Fonts");
        dispatch::run_font_phase(&fonts, &ctx, &mut tracker, opts);
    }

    if run_apps {
        ui::section("Applications");
        dispatch::run_install_phase(&apps, &ctx, &mut tracker, opts);
        for (name, err) in &app_errors {
            tracker.error(dispatch::APPS_PHASE, &format!("{name}: {err}"));
        }
    }

    if run_cleanup {
        ui::section("Cleanup");
        dispatch::run_cleanup_phase(&ctx, &mut tracker, opts);
    }

    if args.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return Ok(());
    }

    ui::header("Summary");
    print!("{}", tracker.render(app.verbose > 0));

    let failed = tracker.total_failed();
    if failed > 0 {
        anyhow::bail!("{failed} item(s) failed");
    }
    ui::success("All phases completed");
    Ok(())
}

fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()
        .context("Failed to read confirmation")
}
