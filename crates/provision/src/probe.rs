//! Read-only installed-state checks.
//!
//! Each provider has its own listing command and its own notion of a
//! positive match; all of that string-matching fragility is contained
//! here so the resolution engine never parses CLI output itself.

use log::{debug, warn};

use crate::context::Context;
use crate::item::{Item, LocationPolicy, Provider};
use crate::paths;

/// Whether `item` is already present on the system.
///
/// An absent provider CLI is treated as "not installed" rather than an
/// error; the engine then attempts the install and surfaces any real
/// failure there.
pub fn is_installed(item: &Item, ctx: &Context) -> bool {
    let id = item.identifier();
    match item.provider {
        // Store-sourced packages are listed identically by winget.
        Provider::Winget | Provider::Store => listing_contains(
            ctx,
            "winget",
            &["list", "--id", id, "--exact", "--accept-source-agreements"],
            id,
        ),
        Provider::Choco => listing_contains(
            ctx,
            "choco",
            &["list", "--exact", "--limit-output", id],
            id,
        ),
        Provider::Scoop => listing_contains(ctx, "scoop", &["list", id], id),
        Provider::Download | Provider::GithubRelease => location_exists(item),
    }
}

/// A zero exit status alone is not enough: winget, choco and scoop all
/// exit 0 when nothing matches, so the identifier must also appear in
/// the output.
fn listing_contains(ctx: &Context, program: &str, args: &[&str], needle: &str) -> bool {
    match ctx.runner.run(program, args) {
        Ok(out) => out.success && contains_ignore_case(&out.stdout, needle),
        Err(err) => {
            debug!("{program} unavailable while probing for {needle}: {err:#}");
            false
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// Download-style items are installed iff their configured location
/// exists. Without a location the state is unknowable; that coverage
/// gap is logged, not masked.
fn location_exists(item: &Item) -> bool {
    match &item.location {
        LocationPolicy::Explicit(path) => paths::expand(path).exists(),
        LocationPolicy::Auto | LocationPolicy::Suppressed => {
            warn!(
                "{}: no install location configured; cannot determine installed state, assuming absent",
                item.key
            );
            false
        }
    }
}
