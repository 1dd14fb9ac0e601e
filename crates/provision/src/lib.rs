//! Install/remove engine for Windows provisioning.
//!
//! This crate decides, for every declared application or font, how to
//! reach its desired state:
//!
//! - probe whether it is already present ([`probe`])
//! - resolve the right provider method, falling back where a cascade
//!   is defined ([`install`], [`removal`], [`fonts`])
//! - record one outcome per item into a per-phase [`tracker::Tracker`]
//!
//! Every external effect (process spawn, HTTP download, archive
//! extraction, release metadata) goes through a trait in [`context`],
//! so the whole engine can run against recording fakes. The binary
//! wires in the real implementations.

pub mod cleanup;
pub mod context;
pub mod dispatch;
pub mod fonts;
pub mod install;
pub mod item;
pub mod paths;
pub mod probe;
pub mod removal;
pub mod tracker;

#[cfg(test)]
pub(crate) mod testutil;

pub use context::{
    AssetInfo, Bootstrap, CmdOutput, CommandRunner, Context, Extractor, Fetcher, ManifestSource,
    NoProgress, Progress, ReleaseInfo, ReleaseSource,
};
pub use item::{DesiredState, Item, ItemExtras, LocationPolicy, Provider};
pub use tracker::{Outcome, PhaseStats, Tracker};
