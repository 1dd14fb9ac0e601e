//! Config command - show, validate and locate the configuration.

use anyhow::Result;

use crate::Context;
use crate::config;
use crate::ui;

pub fn show(ctx: &Context) -> Result<()> {
    let path = config::locate(ctx.config.as_deref())?;
    let cfg = config::load(&path)?;

    ui::kv("config", &path.display().to_string());
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}

pub fn validate(ctx: &Context) -> Result<()> {
    let path = config::locate(ctx.config.as_deref())?;
    let cfg = config::load(&path)?;

    // Entry-level conversion reports every invalid entry, not just the
    // first one.
    let (apps, app_errors) = cfg.app_items();
    let (debloat, debloat_errors) = cfg.debloat_items();

    for (name, err) in app_errors.iter().chain(debloat_errors.iter()) {
        ui::error(&format!("{name}: {err}"));
    }

    if app_errors.is_empty() && debloat_errors.is_empty() {
        ui::success(&format!(
            "{} valid ({} apps, {} debloat entries, {} fonts)",
            path.display(),
            apps.len(),
            debloat.len(),
            cfg.fonts.nerd_fonts.len()
        ));
        Ok(())
    } else {
        anyhow::bail!(
            "{} invalid entr{}",
            app_errors.len() + debloat_errors.len(),
            if app_errors.len() + debloat_errors.len() == 1 {
                "y"
            } else {
                "ies"
            }
        )
    }
}

pub fn path(ctx: &Context) -> Result<()> {
    let path = config::locate(ctx.config.as_deref())?;
    println!("{}", path.display());
    Ok(())
}
