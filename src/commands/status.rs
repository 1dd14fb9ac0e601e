//! Status command - read-only install-state report.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use crate::Context as AppContext;
use crate::bootstrap::ProviderBootstrap;
use crate::config;
use crate::host::{GithubReleases, HttpFetcher, ZipExtractor};
use crate::manifest::FileManifest;
use crate::runner::ShellRunner;
use crate::ui;
use provision::fonts::font_installed;
use provision::{Context, DesiredState, NoProgress, probe};

const SYSTEM_FONT_DIR: &str = "C:\\Windows\\Fonts";

pub fn run(app: &AppContext) -> Result<()> {
    let path = config::locate(app.config.as_deref())?;
    let cfg = config::load(&path)?;

    let runner = ShellRunner;
    let fetcher = HttpFetcher::new();
    let extractor = ZipExtractor;
    let manifest = FileManifest::load(&path);
    let releases = GithubReleases::new();
    let bootstrap = ProviderBootstrap::new(&runner);

    let ctx = Context {
        runner: &runner,
        fetcher: &fetcher,
        extractor: &extractor,
        manifest: &manifest,
        releases: &releases,
        bootstrap: &bootstrap,
        progress: &NoProgress,
        font_dir: PathBuf::from(SYSTEM_FONT_DIR),
    };

    ui::header("Applications");
    for entry in &cfg.apps {
        match entry.to_item() {
            Ok(item) if item.state == DesiredState::Ignore => {
                println!("  {} {} (ignored)", "-".dimmed(), item.key.dimmed());
            }
            Ok(item) => {
                let installed = probe::is_installed(&item, &ctx);
                let symbol = if installed {
                    "✓".green()
                } else {
                    "✗".red()
                };
                println!(
                    "  {symbol} {} ({} via {})",
                    item.key,
                    item.identifier(),
                    item.provider
                );
            }
            Err(err) => println!("  {} {}: {err:#}", "!".yellow(), entry.name),
        }
    }

    if !cfg.debloat.is_empty() {
        ui::header("Debloat targets");
        for entry in &cfg.debloat {
            match entry.to_item() {
                Ok(item) => {
                    // For removals, "absent" is the good state.
                    let present = probe::is_installed(&item, &ctx);
                    let symbol = if present { "✗".red() } else { "✓".green() };
                    let state = if present { "still present" } else { "gone" };
                    println!("  {symbol} {} ({state})", item.key);
                }
                Err(err) => println!("  {} {}: {err:#}", "!".yellow(), entry.name),
            }
        }
    }

    if !cfg.fonts.nerd_fonts.is_empty() {
        ui::header("Fonts");
        for font in &cfg.fonts.nerd_fonts {
            let installed = font_installed(font, &ctx);
            let symbol = if installed { "✓".green() } else { "✗".red() };
            println!("  {symbol} {font}");
        }
    }

    Ok(())
}
