//! Acquisition orchestration: resolve, locate, download-or-reuse.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::artifact::ArtifactCoordinates;
use crate::config::ToolchainConfig;
use crate::resolver::VersionResolver;
use crate::tools::{AssetFetcher, PendingDownload, ReleaseLookup, TagLookup, ToolCache};
use crate::version::VersionSpecifier;
use crate::{Error, Result};

/// Outcome of a successful acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledToolchain {
    /// Where the artifact was found.
    pub coordinates: ArtifactCoordinates,
    /// Local directory the toolchain is installed in.
    pub home: PathBuf,
}

impl InstalledToolchain {
    /// The resolved version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.coordinates.version
    }

    /// Directory holding `java`, `native-image` and friends.
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.home.join("bin")
    }
}

/// Sets up Mandrel toolchains through the configured collaborators.
///
/// One invocation performs at most two suspending steps in sequence: the
/// upstream lookup (skipped for fully-qualified versions) and the cache's
/// download-or-reuse.
pub struct MandrelSetup {
    config: ToolchainConfig,
    releases: Arc<dyn ReleaseLookup>,
    tags: Arc<dyn TagLookup>,
    fetcher: Arc<dyn AssetFetcher>,
    cache: Arc<dyn ToolCache>,
}

impl MandrelSetup {
    /// Create an orchestrator.
    #[must_use]
    pub fn new(
        config: ToolchainConfig,
        releases: Arc<dyn ReleaseLookup>,
        tags: Arc<dyn TagLookup>,
        fetcher: Arc<dyn AssetFetcher>,
        cache: Arc<dyn ToolCache>,
    ) -> Self {
        Self {
            config,
            releases,
            tags,
            fetcher,
            cache,
        }
    }

    /// The configuration this orchestrator builds coordinates from.
    #[must_use]
    pub const fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    /// A resolver borrowing this orchestrator's lookups.
    #[must_use]
    pub fn resolver(&self) -> VersionResolver<'_> {
        VersionResolver::new(&self.config, self.releases.as_ref(), self.tags.as_ref())
    }

    /// Resolve a raw specifier without downloading anything.
    ///
    /// # Errors
    ///
    /// Returns the resolver's error.
    pub async fn resolve(&self, specifier: &str) -> Result<String> {
        self.resolver().resolve_str(specifier).await
    }

    /// Resolve a raw specifier and build its artifact coordinates.
    ///
    /// # Errors
    ///
    /// Returns the resolver's error.
    pub async fn locate(&self, specifier: &str, java_version: &str) -> Result<ArtifactCoordinates> {
        let classified = VersionSpecifier::classify(specifier, &self.config.tag_prefix())?;
        debug!(
            %classified,
            lookup = classified.needs_lookup(),
            "Classified version specifier"
        );
        let version = self.resolver().resolve(&classified).await?;
        Ok(ArtifactCoordinates::new(&self.config, &version, java_version))
    }

    /// Resolve, locate and acquire a toolchain.
    ///
    /// # Errors
    ///
    /// Returns the resolver's error, or `AcquisitionFailed` tagged with the
    /// specifier and resolved version if the cache collaborator fails.
    #[instrument(skip(self), fields(platform = %self.config.platform))]
    pub async fn install(&self, specifier: &str, java_version: &str) -> Result<InstalledToolchain> {
        let coordinates = self.locate(specifier, java_version).await?;
        info!(
            version = %coordinates.version,
            tool = %coordinates.tool_name,
            url = %coordinates.download_url,
            "Acquiring Mandrel"
        );

        let download = PendingDownload::new(self.fetcher.as_ref(), &coordinates.download_url);
        let home = self
            .cache
            .download_extract_and_cache(download, &coordinates.tool_name, &coordinates.version)
            .await
            .map_err(|e| {
                Error::acquisition_failed(specifier.trim(), &coordinates.version, e.to_string())
            })?;

        info!(version = %coordinates.version, home = %home.display(), "Mandrel ready");
        Ok(InstalledToolchain { coordinates, home })
    }

    /// Set up the toolchain and return its install path.
    ///
    /// # Errors
    ///
    /// See [`MandrelSetup::install`].
    pub async fn set_up_toolchain(&self, specifier: &str, java_version: &str) -> Result<PathBuf> {
        self.install(specifier, java_version)
            .await
            .map(|installed| installed.home)
    }
}

impl std::fmt::Debug for MandrelSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MandrelSetup")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
