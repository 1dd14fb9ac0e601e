//! winget installs, including the install-location policy.

use anyhow::{Result, bail};
use std::path::PathBuf;

use super::{Resolution, tail};
use crate::context::Context;
use crate::item::{Item, LocationPolicy};
use crate::paths;

/// Generic fallback root when no manifest location is known.
pub(crate) fn default_install_root(key: &str) -> PathBuf {
    paths::expand(&format!("%ProgramFiles%\\{key}"))
}

pub(crate) fn install(item: &Item, ctx: &Context) -> Result<Resolution> {
    let mut args: Vec<String> = [
        "install",
        "--id",
        item.identifier(),
        "--exact",
        "--silent",
        "--accept-package-agreements",
        "--accept-source-agreements",
    ]
    .map(String::from)
    .to_vec();

    if let Some(location) = resolve_location(item, ctx) {
        args.push("--location".to_string());
        args.push(location);
    }

    run(ctx, &args)?;
    Ok(Resolution::Done("installed".to_string()))
}

/// `Auto` consults the manifest lookup and falls back to the generic
/// default root; `Suppressed` omits the argument entirely.
fn resolve_location(item: &Item, ctx: &Context) -> Option<String> {
    match &item.location {
        LocationPolicy::Auto => {
            let path = ctx
                .manifest
                .default_install_location(item.identifier())
                .unwrap_or_else(|| default_install_root(&item.key));
            Some(path.display().to_string())
        }
        LocationPolicy::Explicit(path) => Some(paths::expand(path).display().to_string()),
        LocationPolicy::Suppressed => None,
    }
}

pub(crate) fn uninstall(id: &str, ctx: &Context) -> Result<()> {
    let out = ctx.runner.run(
        "winget",
        &[
            "uninstall",
            "--id",
            id,
            "--exact",
            "--silent",
            "--accept-source-agreements",
        ],
    )?;
    if !out.success {
        bail!("winget uninstall failed: {}", tail(&out));
    }
    Ok(())
}

/// Run winget with the given args, treating a nonzero exit as a hard
/// failure for the item. No retry happens at this layer.
pub(crate) fn run(ctx: &Context, args: &[String]) -> Result<()> {
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let out = ctx.runner.run("winget", &refs)?;
    if !out.success {
        bail!(
            "winget {} failed: {}",
            refs.first().copied().unwrap_or_default(),
            tail(&out)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{DesiredState, Provider};
    use crate::testutil::TestHost;

    fn item() -> Item {
        Item::new("VSCode", Provider::Winget, DesiredState::Install)
            .with_identifier("Publisher.VSCode")
    }

    #[test]
    fn auto_location_falls_back_to_default_root() {
        let host = TestHost::new();
        install(&item(), &host.ctx()).expect("install succeeds");

        let calls = host.runner.calls_matching("winget", "install");
        assert_eq!(calls.len(), 1);
        let args = &calls[0].1;
        let location_index = args
            .iter()
            .position(|a| a == "--location")
            .expect("location argument present");
        assert!(args[location_index + 1].ends_with("VSCode"));
        assert_eq!(*host.manifest.queries.borrow(), vec!["Publisher.VSCode"]);
    }

    #[test]
    fn manifest_location_is_preferred() {
        let host = TestHost::new();
        *host.manifest.location.borrow_mut() = Some(PathBuf::from("D:\\Apps\\VSCode"));
        install(&item(), &host.ctx()).expect("install succeeds");

        let calls = host.runner.calls_matching("winget", "install");
        assert!(calls[0].1.iter().any(|a| a == "D:\\Apps\\VSCode"));
    }

    #[test]
    fn suppressed_location_omits_argument() {
        let host = TestHost::new();
        let item = item().with_location(LocationPolicy::Suppressed);
        install(&item, &host.ctx()).expect("install succeeds");

        let calls = host.runner.calls_matching("winget", "install");
        assert!(!calls[0].1.iter().any(|a| a == "--location"));
    }

    #[test]
    fn nonzero_exit_is_a_hard_failure() {
        let host = TestHost::new();
        host.runner.on(
            "winget",
            "install",
            crate::context::CmdOutput::fail("installer hash does not match"),
        );
        let err = install(&item(), &host.ctx()).expect_err("install fails");
        assert!(format!("{err:#}").contains("hash does not match"));
        // One attempt only - no retry at this layer.
        assert_eq!(host.runner.calls_matching("winget", "install").len(), 1);
    }
}
