//! Debloat removal: provider uninstall first, then AppX package
//! removal, then provisioned-package removal. Stops at the first
//! success; absence after every step is itself a success, since the
//! goal is for the item to be gone.

use anyhow::{Result, bail};
use log::{info, warn};

use crate::context::{CmdOutput, Context};
use crate::install::{choco, tail, winget};
use crate::item::{Item, Provider};
use crate::probe;
use crate::tracker::{Outcome, Tracker};

/// Remove one item, recording exactly one outcome for it. Nothing a
/// strategy does can escape this function.
pub fn remove(item: &Item, ctx: &Context, tracker: &mut Tracker, phase: &str) -> Outcome {
    let label = format!("{} ({})", item.key, item.identifier());
    match remove_inner(item, ctx) {
        Ok(how) => {
            let detail = format!("{label}: {how}");
            info!("{detail}");
            tracker.record(phase, Outcome::Success, &detail);
            Outcome::Success
        }
        Err(err) => {
            let detail = format!("{label}: {err:#}");
            warn!("{detail}");
            tracker.record(phase, Outcome::Error, &detail);
            Outcome::Error
        }
    }
}

fn remove_inner(item: &Item, ctx: &Context) -> Result<String> {
    // 1. Provider uninstall, when the provider supports uninstalling
    //    and currently lists the package.
    if let Some(uninstall) = provider_uninstall(item.provider)
        && probe::is_installed(item, ctx)
    {
        match uninstall(item.identifier(), ctx) {
            Ok(()) => return Ok("uninstalled via package manager".to_string()),
            Err(err) => warn!(
                "{}: package manager uninstall failed ({err:#}); trying AppX removal",
                item.key
            ),
        }
    }

    // 2. Installed AppX package. A failure here falls through to the
    //    provisioned-package step.
    match remove_appx(item, ctx) {
        Ok(true) => return Ok("AppX package removed".to_string()),
        Ok(false) => {}
        Err(err) => warn!(
            "{}: AppX removal failed ({err:#}); trying provisioned package",
            item.key
        ),
    }

    // 3. Provisioned package in the system image.
    if remove_provisioned(item, ctx)? {
        return Ok("provisioned package removed".to_string());
    }

    Ok("not found or already removed".to_string())
}

type UninstallFn = fn(&str, &Context) -> Result<()>;

fn provider_uninstall(provider: Provider) -> Option<UninstallFn> {
    match provider {
        Provider::Winget => Some(winget::uninstall),
        Provider::Choco => Some(choco::uninstall),
        _ => None,
    }
}

fn remove_appx(item: &Item, ctx: &Context) -> Result<bool> {
    let id = item.identifier();
    let listed = powershell(ctx, &format!("(Get-AppxPackage -Name '*{id}*').Name"))?;
    if listed.stdout.trim().is_empty() {
        return Ok(false);
    }

    let removed = powershell(
        ctx,
        &format!("Get-AppxPackage -Name '*{id}*' | Remove-AppxPackage"),
    )?;
    if !removed.success {
        bail!("Remove-AppxPackage failed: {}", tail(&removed));
    }
    Ok(true)
}

fn remove_provisioned(item: &Item, ctx: &Context) -> Result<bool> {
    let id = item.identifier();
    let listed = powershell(
        ctx,
        &format!(
            "(Get-AppxProvisionedPackage -Online | Where-Object {{ $_.DisplayName -like '*{id}*' }}).PackageName"
        ),
    )?;
    // Fuzzy name match; the first hit is deprovisioned.
    let Some(package) = listed
        .stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
    else {
        return Ok(false);
    };

    let removed = powershell(
        ctx,
        &format!("Remove-AppxProvisionedPackage -Online -PackageName '{package}'"),
    )?;
    if !removed.success {
        bail!("Remove-AppxProvisionedPackage failed: {}", tail(&removed));
    }
    Ok(true)
}

fn powershell(ctx: &Context, script: &str) -> Result<CmdOutput> {
    ctx.runner.run(
        "powershell",
        &["-NoProfile", "-NonInteractive", "-Command", script],
    )
}
