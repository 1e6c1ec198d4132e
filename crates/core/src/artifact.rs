//! Artifact identifier, cache tool name and download URL construction.

use serde::{Deserialize, Serialize};

use crate::config::ToolchainConfig;

/// Where a resolved release lives and how the cache files it.
///
/// The three strings derive from the same inputs: the cache key
/// `(tool_name, version)` together with the cache's architecture names
/// exactly one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactCoordinates {
    /// Resolved version the artifact belongs to.
    pub version: String,
    /// e.g. "mandrel-java17-linux-amd64-21.3.0.0-Final".
    pub identifier: String,
    /// e.g. "mandrel-java17-linux"; never contains version or arch.
    pub tool_name: String,
    /// Full URL of the release asset.
    pub download_url: String,
}

impl ArtifactCoordinates {
    /// Build the coordinates of `version` for `java_version` on the
    /// configured platform.
    #[must_use]
    pub fn new(config: &ToolchainConfig, version: &str, java_version: &str) -> Self {
        let identifier = artifact_identifier(config, version, java_version);
        let download_url = download_url(config, version, &identifier);
        Self {
            version: version.to_string(),
            tool_name: tool_name(config, java_version),
            identifier,
            download_url,
        }
    }

    /// File name of the downloaded archive.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.download_url
            .rsplit('/')
            .next()
            .unwrap_or(&self.download_url)
    }
}

/// `<namespace>-java<java>-<platform>-<arch>-<version>`
#[must_use]
pub fn artifact_identifier(config: &ToolchainConfig, version: &str, java_version: &str) -> String {
    format!(
        "{}-java{}-{}-{}-{}",
        config.namespace, java_version, config.platform.os, config.platform.arch, version
    )
}

/// `<namespace>-java<java>-<platform>`
#[must_use]
pub fn tool_name(config: &ToolchainConfig, java_version: &str) -> String {
    format!(
        "{}-java{}-{}",
        config.namespace, java_version, config.platform.os
    )
}

/// `<base>/<namespace>-<version>/<identifier><extension>`
#[must_use]
pub fn download_url(config: &ToolchainConfig, version: &str, identifier: &str) -> String {
    format!(
        "{}/{}-{}/{}{}",
        config.download_base,
        config.namespace,
        version,
        identifier,
        config.file_extension()
    )
}
