//! Resolution of version specifiers to concrete Mandrel releases.

use tracing::{debug, info, instrument};

use crate::config::ToolchainConfig;
use crate::tools::{ReleaseLookup, TagLookup};
use crate::version::{ReleaseVersion, VersionSpecifier};
use crate::{Error, Result};

/// Resolves [`VersionSpecifier`]s against the upstream release listing.
///
/// Holds no mutable state; concurrent resolutions with one resolver are
/// independent.
pub struct VersionResolver<'a> {
    config: &'a ToolchainConfig,
    releases: &'a dyn ReleaseLookup,
    tags: &'a dyn TagLookup,
}

impl<'a> VersionResolver<'a> {
    /// Create a resolver over the given lookups.
    #[must_use]
    pub fn new(
        config: &'a ToolchainConfig,
        releases: &'a dyn ReleaseLookup,
        tags: &'a dyn TagLookup,
    ) -> Self {
        Self {
            config,
            releases,
            tags,
        }
    }

    /// Classify and resolve a raw specifier.
    ///
    /// # Errors
    ///
    /// See [`VersionResolver::resolve`]; additionally `InvalidSpecifier` for
    /// an empty input.
    pub async fn resolve_str(&self, raw: &str) -> Result<String> {
        let specifier = VersionSpecifier::classify(raw, &self.config.tag_prefix())?;
        self.resolve(&specifier).await
    }

    /// Resolve a classified specifier to a fully-qualified version.
    ///
    /// Fully-qualified specifiers are returned unchanged without any lookup.
    ///
    /// # Errors
    ///
    /// - `MalformedUpstreamTag` if the latest release is tagged outside the namespace
    /// - `VersionNotFound` if no valid release matches a prefix
    /// - `UpstreamUnavailable` if a lookup fails
    #[instrument(skip_all, fields(specifier = %specifier))]
    pub async fn resolve(&self, specifier: &VersionSpecifier) -> Result<String> {
        match specifier {
            VersionSpecifier::Latest => self.resolve_latest().await,
            VersionSpecifier::Prefix(prefix) => self.find_latest_version(prefix).await,
            VersionSpecifier::FullyQualified(version) => {
                debug!(%version, "Version is fully qualified, skipping lookup");
                Ok(version.clone())
            }
        }
    }

    /// Resolve `latest` through the repository's most recent release.
    async fn resolve_latest(&self) -> Result<String> {
        let release = self.releases.latest_release(&self.config.repo).await?;
        let tag_prefix = self.config.tag_prefix();

        let Some(version) = version_from_tag(&release.tag_name, &tag_prefix) else {
            return Err(Error::malformed_upstream_tag(&release.tag_name));
        };
        info!(tag = %release.tag_name, %version, "Found latest release");

        let specifier = VersionSpecifier::classify(version, &tag_prefix)?;
        match specifier {
            // The latest tag is expected to be fully qualified already; a
            // shorter one is still answered through the tag scan.
            VersionSpecifier::Latest => Err(Error::malformed_upstream_tag(&release.tag_name)),
            VersionSpecifier::Prefix(prefix) => self.find_latest_version(&prefix).await,
            VersionSpecifier::FullyQualified(version) => Ok(version),
        }
    }

    /// Scan the tags matching a prefix and return the highest valid version.
    async fn find_latest_version(&self, prefix: &str) -> Result<String> {
        let pattern = format!("{}{}", self.config.tag_prefix(), prefix);
        let refs = self.tags.matching_tags(&pattern).await?;
        debug!(%pattern, count = refs.len(), "Fetched matching tags");

        let mut highest: Option<ReleaseVersion> = None;
        for tag_ref in &refs {
            // Tags read '<namespace>-<version>-Final'
            let Some(candidate) = tag_ref.tag().split('-').nth(1) else {
                continue;
            };
            let Some(version) = ReleaseVersion::parse(candidate) else {
                debug!(tag = %tag_ref.tag(), "Ignoring tag without a valid version");
                continue;
            };
            if highest.as_ref().is_none_or(|h| version > *h) {
                highest = Some(version);
            }
        }

        let version = highest.ok_or_else(|| Error::version_not_found(prefix))?;
        info!(%prefix, %version, "Resolved version prefix");
        Ok(version.as_str().to_string())
    }
}

/// Version encoded in a release tag: the first dash-delimited field after
/// `tag_prefix`.
fn version_from_tag<'t>(tag: &'t str, tag_prefix: &str) -> Option<&'t str> {
    let rest = tag.strip_prefix(tag_prefix)?;
    rest.split('-').next().filter(|v| !v.is_empty())
}
