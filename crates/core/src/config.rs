//! Toolchain configuration.
//!
//! Everything that names the upstream distribution (repository, tag
//! namespace, download host) and the build target lives in one explicit
//! [`ToolchainConfig`] value handed to the resolver and the identifier
//! builder at construction.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::tools::{Arch, Os, Platform};

/// GitHub organization hosting Mandrel releases.
pub const DEFAULT_OWNER: &str = "graalvm";
/// Repository Mandrel releases are published from.
pub const DEFAULT_REPO: &str = "mandrel";
/// Namespace prefixing Mandrel tags and artifact names.
pub const DEFAULT_NAMESPACE: &str = "mandrel";
/// Base URL release assets are downloaded from.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com/graalvm/mandrel/releases/download";

/// Configuration of one toolchain distribution on one build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolchainConfig {
    /// Owner of the upstream repository.
    pub owner: String,
    /// Name of the upstream repository.
    pub repo: String,
    /// Namespace of tags and artifact names (tags read `<namespace>-<version>-Final`).
    pub namespace: String,
    /// Base URL for release downloads, without trailing slash.
    pub download_base: String,
    /// Build target.
    pub platform: Platform,
    /// Archive extension override; defaults to the platform's extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
}

impl ToolchainConfig {
    /// Mandrel configuration for the given build target.
    #[must_use]
    pub fn mandrel(platform: Platform) -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
            platform,
            file_extension: None,
        }
    }

    /// Mandrel configuration for the running host.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the host has no Mandrel build.
    pub fn for_current_platform() -> Result<Self> {
        Ok(Self::mandrel(Platform::current()?))
    }

    /// Override the operating system only.
    #[must_use]
    pub const fn with_os(mut self, os: Os) -> Self {
        self.platform.os = os;
        self
    }

    /// Override the architecture only.
    #[must_use]
    pub const fn with_arch(mut self, arch: Arch) -> Self {
        self.platform.arch = arch;
        self
    }

    /// Override the download base URL.
    #[must_use]
    pub fn with_download_base(mut self, base: impl Into<String>) -> Self {
        self.download_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the archive file extension.
    #[must_use]
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = Some(extension.into());
        self
    }

    /// Prefix every release tag starts with, e.g. "mandrel-".
    #[must_use]
    pub fn tag_prefix(&self) -> String {
        format!("{}-", self.namespace)
    }

    /// Archive extension, including the leading dot.
    #[must_use]
    pub fn file_extension(&self) -> &str {
        self.file_extension
            .as_deref()
            .unwrap_or_else(|| self.platform.archive_extension())
    }
}
