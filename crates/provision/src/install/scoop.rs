//! Scoop installs. Bucket registration failures are tolerated.

use anyhow::{Result, bail};
use log::warn;

use super::{Resolution, tail};
use crate::context::Context;
use crate::item::Item;

pub(crate) fn install(item: &Item, ctx: &Context) -> Result<Resolution> {
    if let Some(bucket) = &item.extras.bucket {
        ensure_bucket(bucket, ctx);
    }

    let id = item.identifier();
    let out = ctx.runner.run("scoop", &["install", id])?;
    if !out.success {
        bail!("scoop install {id} failed: {}", tail(&out));
    }
    Ok(Resolution::Done("installed".to_string()))
}

/// Adding a bucket that already exists (or failing to add one at all)
/// is not fatal; the install attempt proceeds regardless.
pub(crate) fn ensure_bucket(bucket: &str, ctx: &Context) {
    match ctx.runner.run("scoop", &["bucket", "add", bucket]) {
        Ok(out) if out.success => {}
        Ok(out) => warn!("scoop bucket add {bucket}: {}", tail(&out)),
        Err(err) => warn!("scoop bucket add {bucket}: {err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CmdOutput;
    use crate::item::{DesiredState, ItemExtras, Provider};
    use crate::testutil::TestHost;

    #[test]
    fn bucket_is_added_before_install() {
        let host = TestHost::new();
        let item = Item::new("ripgrep", Provider::Scoop, DesiredState::Install).with_extras(
            ItemExtras {
                bucket: Some("extras".to_string()),
                ..ItemExtras::default()
            },
        );
        install(&item, &host.ctx()).expect("install succeeds");

        let calls = host.runner.calls_to("scoop");
        assert_eq!(calls[0].1[..2], ["bucket".to_string(), "add".to_string()]);
        assert_eq!(calls[1].1[0], "install");
    }

    #[test]
    fn bucket_failure_does_not_stop_install() {
        let host = TestHost::new();
        host.runner
            .on("scoop", "bucket", CmdOutput::fail("bucket already exists"));
        let item = Item::new("ripgrep", Provider::Scoop, DesiredState::Install).with_extras(
            ItemExtras {
                bucket: Some("extras".to_string()),
                ..ItemExtras::default()
            },
        );
        install(&item, &host.ctx()).expect("install still succeeds");
        assert_eq!(host.runner.calls_matching("scoop", "install").len(), 1);
    }

    #[test]
    fn no_bucket_means_no_bucket_call() {
        let host = TestHost::new();
        let item = Item::new("ripgrep", Provider::Scoop, DesiredState::Install);
        install(&item, &host.ctx()).expect("install succeeds");
        assert!(host.runner.calls_matching("scoop", "bucket").is_empty());
    }
}
