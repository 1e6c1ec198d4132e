//! Platform identification and the collaborator seams of the core.
//!
//! - [`Platform`], [`Os`], [`Arch`] - build target identification
//! - [`ReleaseLookup`], [`TagLookup`] - upstream release metadata
//! - [`AssetFetcher`], [`PendingDownload`] - raw artifact download
//! - [`ToolCache`] - download-or-reuse of extracted toolchains

mod platform;
mod provider;

pub use platform::{Arch, Os, Platform};
pub use provider::{
    AssetFetcher, LatestRelease, PendingDownload, ReleaseLookup, TAG_REF_PREFIX, TagLookup,
    TagRef, ToolCache,
};
