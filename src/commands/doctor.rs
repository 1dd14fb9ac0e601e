//! Doctor command - health checks for provider tooling, elevation,
//! configuration and available updates.

use anyhow::Result;
use colored::Colorize;
use log::debug;

use crate::Context;
use crate::config;
use crate::elevation;
use crate::runner::ShellRunner;
use crate::ui;
use provision::CommandRunner;

/// Repository checked for newer winsetup releases.
const SELF_REPO: &str = "winsetup/winsetup";

struct Issue {
    category: &'static str,
    summary: String,
    fix: Option<String>,
}

pub fn run(ctx: &Context) -> Result<()> {
    ui::header("System Health Check");

    let runner = ShellRunner;
    let mut issues: Vec<Issue> = Vec::new();

    check_providers(&runner, &mut issues);
    check_elevation(&runner, &mut issues);
    check_config(ctx, &mut issues);
    check_update(&mut issues);

    println!();
    if issues.is_empty() {
        ui::success("All systems healthy!");
    } else {
        print_issue_summary(&issues);
    }

    Ok(())
}

fn check_providers(runner: &ShellRunner, issues: &mut Vec<Issue>) {
    ui::section("Provider tooling");

    let tools: [(&str, &str); 4] = [
        ("winget", "ships with Windows 10 1809+; install App Installer from the Store"),
        ("choco", "installed automatically during apply, or see chocolatey.org/install"),
        ("scoop", "installed automatically during apply, or see scoop.sh"),
        ("powershell", "required for AppX removal and cleanup"),
    ];

    for (tool, fix) in tools {
        if runner.command_exists(tool) {
            println!("  {} {tool}", "✓".green());
        } else {
            println!("  {} {tool} not found", "✗".red());
            issues.push(Issue {
                category: "providers",
                summary: format!("{tool} is not available"),
                fix: Some(fix.to_string()),
            });
        }
    }
}

fn check_elevation(runner: &ShellRunner, issues: &mut Vec<Issue>) {
    ui::section("Privileges");

    if elevation::is_elevated(runner) {
        println!("  {} running as administrator", "✓".green());
    } else {
        println!("  {} not elevated", "⚠".yellow());
        issues.push(Issue {
            category: "privileges",
            summary: "not running as administrator".to_string(),
            fix: Some("re-run from an elevated terminal before applying".to_string()),
        });
    }
}

fn check_config(ctx: &Context, issues: &mut Vec<Issue>) {
    ui::section("Configuration");

    let path = match config::locate(ctx.config.as_deref()) {
        Ok(path) => path,
        Err(err) => {
            issues.push(Issue {
                category: "config",
                summary: format!("cannot resolve config location: {err:#}"),
                fix: None,
            });
            return;
        }
    };

    if !path.exists() {
        println!("  {} no config at {}", "⚠".yellow(), path.display());
        issues.push(Issue {
            category: "config",
            summary: format!("config file not found: {}", path.display()),
            fix: Some(format!("create {} or pass --config", config::CONFIG_FILE)),
        });
        return;
    }

    match config::load(&path).and_then(|cfg| {
        cfg.validate()?;
        Ok(cfg)
    }) {
        Ok(cfg) => {
            println!(
                "  {} {} ({} apps, {} debloat, {} fonts)",
                "✓".green(),
                path.display(),
                cfg.apps.len(),
                cfg.debloat.len(),
                cfg.fonts.nerd_fonts.len()
            );
        }
        Err(err) => {
            println!("  {} {}", "✗".red(), path.display());
            issues.push(Issue {
                category: "config",
                summary: format!("{err:#}"),
                fix: Some("run 'winsetup config validate' after editing".to_string()),
            });
        }
    }
}

fn check_update(issues: &mut Vec<Issue>) {
    ui::section("Updates");

    let client = ghrel::Client::new();
    match client.latest_release(SELF_REPO) {
        Ok(release) => {
            let latest = ghrel::normalize_tag(&release.tag);
            let current = env!("CARGO_PKG_VERSION");
            if latest == current {
                println!("  {} up to date ({current})", "✓".green());
            } else {
                println!("  {} {latest} available (running {current})", "⚠".yellow());
                issues.push(Issue {
                    category: "updates",
                    summary: format!("a newer release ({latest}) is available"),
                    fix: Some(format!("download it from github.com/{SELF_REPO}/releases")),
                });
            }
        }
        Err(err) => {
            // Offline is fine; the check is best-effort.
            debug!("update check failed: {err}");
            println!("  {} update check skipped (offline?)", "-".dimmed());
        }
    }
}

fn print_issue_summary(issues: &[Issue]) {
    let count = issues.len();
    let label = if count == 1 { "Issue" } else { "Issues" };
    ui::header(&format!("{count} {label} Found"));

    for (i, issue) in issues.iter().enumerate() {
        let num = i + 1;
        println!(
            "  {}  {} {}",
            format!("{num}.").bold(),
            issue.summary,
            format!("[{}]", issue.category).dimmed()
        );
        if let Some(fix) = &issue.fix {
            println!("      {} {fix}", "Fix:".cyan());
        }
    }
}
