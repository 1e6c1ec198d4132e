//! Version resolution and acquisition orchestration for Mandrel toolchains.
//!
//! Turns a possibly partial version specifier (`latest`, `23.1`,
//! `23.1.2.0-Final`) into a concrete release, builds the platform-specific
//! artifact coordinates for it, and hands the download to a cache that skips
//! work already done.
//!
//! # Architecture
//!
//! - [`VersionSpecifier`] - a request classified once at entry
//! - [`VersionResolver`] - specifier to fully-qualified version
//! - [`ArtifactCoordinates`] - identifier, cache tool name and download URL
//! - [`MandrelSetup`] - the orchestrator the CLI calls
//! - [`tools`] - platform types and the collaborator traits
//!
//! # Example
//!
//! ```ignore
//! use setup_mandrel_core::{MandrelSetup, ToolchainConfig};
//!
//! let config = ToolchainConfig::for_current_platform()?;
//! let setup = MandrelSetup::new(config, github.clone(), github.clone(), github, cache);
//! let home = setup.set_up_toolchain("23.1", "21").await?;
//! ```

pub mod artifact;
pub mod config;
mod error;
pub mod resolver;
pub mod setup;
pub mod tools;
pub mod version;

pub use artifact::ArtifactCoordinates;
pub use config::ToolchainConfig;
pub use error::{Error, Result};
pub use resolver::VersionResolver;
pub use setup::{InstalledToolchain, MandrelSetup};
pub use version::{ReleaseVersion, VersionSpecifier};
