//! Collaborator traits the resolver and orchestrator depend on.
//!
//! Network lookups, raw downloads and the tool cache live outside the core.
//! Each is expressed as a small async trait so the GitHub client and the
//! directory cache can be swapped for in-memory fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::Result;

/// Prefix GitHub puts in front of every tag ref name.
pub const TAG_REF_PREFIX: &str = "refs/tags/";

/// The most recent release of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestRelease {
    /// Tag the release was published under (e.g., "mandrel-23.1.2.0-Final").
    pub tag_name: String,
}

/// A tag ref as returned by a matching-refs query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    /// Full ref name, e.g. "refs/tags/mandrel-21.3.0.0-Final".
    #[serde(rename = "ref")]
    pub name: String,
}

impl TagRef {
    /// Create a tag ref from its full ref name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Tag name without the `refs/tags/` prefix.
    #[must_use]
    pub fn tag(&self) -> &str {
        self.name
            .strip_prefix(TAG_REF_PREFIX)
            .unwrap_or(&self.name)
    }
}

/// Lookup of the most recent release of a repository.
#[async_trait]
pub trait ReleaseLookup: Send + Sync {
    /// Fetch the latest release of `repo`.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamUnavailable` if the release service cannot be reached
    /// or answers with an unexpected payload.
    async fn latest_release(&self, repo: &str) -> Result<LatestRelease>;
}

/// Server-side filtered tag listing.
#[async_trait]
pub trait TagLookup: Send + Sync {
    /// Fetch every tag whose name starts with `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamUnavailable` if the tag service cannot be reached.
    async fn matching_tags(&self, pattern: &str) -> Result<Vec<TagRef>>;
}

/// Raw download of a release asset to a local temporary file.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Download `url` and return the path of the (not yet extracted) file.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    async fn download_tool(&self, url: &str) -> Result<PathBuf>;
}

/// A deferred download handed to the tool cache.
///
/// The cache runs it only on a miss, so a cache hit never touches the
/// network.
#[derive(Clone, Copy)]
pub struct PendingDownload<'a> {
    fetcher: &'a dyn AssetFetcher,
    url: &'a str,
}

impl<'a> PendingDownload<'a> {
    /// Bind a fetcher to the URL it should download.
    #[must_use]
    pub fn new(fetcher: &'a dyn AssetFetcher, url: &'a str) -> Self {
        Self { fetcher, url }
    }

    /// URL that will be downloaded.
    #[must_use]
    pub const fn url(&self) -> &str {
        self.url
    }

    /// Perform the download.
    ///
    /// # Errors
    ///
    /// Propagates the fetcher's error.
    pub async fn fetch(&self) -> Result<PathBuf> {
        self.fetcher.download_tool(self.url).await
    }
}

impl fmt::Debug for PendingDownload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingDownload")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Download-or-reuse cache for extracted toolchains.
#[async_trait]
pub trait ToolCache: Send + Sync {
    /// Return the install path for `(tool_name, version)` on the cache's
    /// architecture, running `download` and extracting its archive only when
    /// no complete entry exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the download, extraction or cache write fails.
    async fn download_extract_and_cache(
        &self,
        download: PendingDownload<'_>,
        tool_name: &str,
        version: &str,
    ) -> Result<PathBuf>;
}
