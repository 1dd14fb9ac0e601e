//! Phase orchestration: group items by provider, ensure the tooling
//! once per group, then resolve items one at a time. Every item is
//! independently wrapped - one item's failure never aborts a sibling.

use log::info;

use crate::cleanup;
use crate::context::Context;
use crate::fonts::{self, FontRequest};
use crate::install;
use crate::item::{DesiredState, Item, Provider};
use crate::removal;
use crate::tracker::{Outcome, Tracker};

pub const APPS_PHASE: &str = "apps";
pub const DEBLOAT_PHASE: &str = "debloat";
pub const FONTS_PHASE: &str = "fonts";
pub const CLEANUP_PHASE: &str = "cleanup";

/// Options for a phase run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Report what would happen without invoking anything.
    pub dry_run: bool,
}

/// Group items by provider, preserving first-appearance group order
/// and declaration order within each group.
pub fn group_by_provider<'a>(
    items: impl IntoIterator<Item = &'a Item>,
) -> Vec<(Provider, Vec<&'a Item>)> {
    let mut groups: Vec<(Provider, Vec<&Item>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(provider, _)| *provider == item.provider) {
            Some((_, bucket)) => bucket.push(item),
            None => groups.push((item.provider, vec![item])),
        }
    }
    groups
}

/// Install every item flagged for install, provider group by provider
/// group.
pub fn run_install_phase(items: &[Item], ctx: &Context, tracker: &mut Tracker, opts: RunOptions) {
    tracker.init_phase(APPS_PHASE);
    let wanted: Vec<&Item> = items
        .iter()
        .filter(|item| item.state == DesiredState::Install)
        .collect();
    ctx.progress.phase_start(APPS_PHASE, wanted.len());

    for (provider, bucket) in group_by_provider(wanted.iter().copied()) {
        if opts.dry_run {
            for item in &bucket {
                info!("would install {} via {provider}", item.key);
                ctx.progress.item_done(APPS_PHASE, &item.key, Outcome::Success);
            }
            continue;
        }

        if !ctx.bootstrap.ensure(provider) {
            // Nothing in this bucket is attempted, and no corrective
            // action ran, so these are warnings rather than failures.
            for item in &bucket {
                tracker.record(
                    APPS_PHASE,
                    Outcome::Warning,
                    &format!("{}: skipped - {provider} unavailable", item.key),
                );
                ctx.progress.item_done(APPS_PHASE, &item.key, Outcome::Warning);
            }
            continue;
        }

        for item in bucket {
            let outcome = install::resolve(item, ctx, tracker, APPS_PHASE);
            ctx.progress.item_done(APPS_PHASE, &item.key, outcome);
        }
    }

    ctx.progress.phase_done(APPS_PHASE);
}

/// Remove every item flagged for removal. The removal cascade carries
/// its own native fallbacks, so no provider gate applies here.
pub fn run_removal_phase(items: &[Item], ctx: &Context, tracker: &mut Tracker, opts: RunOptions) {
    tracker.init_phase(DEBLOAT_PHASE);
    let wanted: Vec<&Item> = items
        .iter()
        .filter(|item| item.state == DesiredState::Remove)
        .collect();
    ctx.progress.phase_start(DEBLOAT_PHASE, wanted.len());

    for item in wanted {
        if opts.dry_run {
            info!("would remove {}", item.key);
            ctx.progress.item_done(DEBLOAT_PHASE, &item.key, Outcome::Success);
            continue;
        }
        let outcome = removal::remove(item, ctx, tracker, DEBLOAT_PHASE);
        ctx.progress.item_done(DEBLOAT_PHASE, &item.key, outcome);
    }

    ctx.progress.phase_done(DEBLOAT_PHASE);
}

/// Ensure every requested font through the font cascade.
pub fn run_font_phase(request: &FontRequest, ctx: &Context, tracker: &mut Tracker, opts: RunOptions) {
    tracker.init_phase(FONTS_PHASE);
    ctx.progress.phase_start(FONTS_PHASE, request.fonts.len());

    if opts.dry_run {
        for font in &request.fonts {
            info!("would ensure font {font}");
            ctx.progress.item_done(FONTS_PHASE, font, Outcome::Success);
        }
    } else {
        fonts::install_all(request, ctx, tracker, FONTS_PHASE);
    }

    ctx.progress.phase_done(FONTS_PHASE);
}

/// Best-effort system cleanup.
pub fn run_cleanup_phase(ctx: &Context, tracker: &mut Tracker, opts: RunOptions) {
    tracker.init_phase(CLEANUP_PHASE);
    if !opts.dry_run {
        cleanup::run_all(ctx, tracker, CLEANUP_PHASE);
    }
}
