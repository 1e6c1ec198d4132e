//! On-disk tool cache for extracted Mandrel toolchains.
//!
//! [`DirectoryToolCache`] implements the core
//! [`ToolCache`](setup_mandrel_core::tools::ToolCache) trait:
//! - a complete entry is returned without touching the network
//! - a miss runs the pending download, unpacks the archive into a staging
//!   directory and renames it into place
//! - entries are marked complete only after the rename succeeds

mod directory;
mod error;
pub mod extract;

pub use directory::{DirectoryToolCache, TOOL_CACHE_ENV, arch_dir_name, default_root};
pub use error::{Error, Result};
pub use extract::ArchiveKind;
