//! Chocolatey installs. No install-location concept here.

use anyhow::{Result, bail};

use super::{Resolution, tail};
use crate::context::Context;
use crate::item::Item;

pub(crate) fn install(item: &Item, ctx: &Context) -> Result<Resolution> {
    let id = item.identifier();
    let out = ctx
        .runner
        .run("choco", &["install", id, "--yes", "--no-progress"])?;
    if !out.success {
        bail!("choco install {id} failed: {}", tail(&out));
    }
    Ok(Resolution::Done("installed".to_string()))
}

pub(crate) fn uninstall(id: &str, ctx: &Context) -> Result<()> {
    let out = ctx.runner.run("choco", &["uninstall", id, "--yes"])?;
    if !out.success {
        bail!("choco uninstall {id} failed: {}", tail(&out));
    }
    Ok(())
}
