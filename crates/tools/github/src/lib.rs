//! GitHub collaborators for setup-mandrel.
//!
//! [`GitHubClient`] implements the core lookup and download traits against
//! the GitHub REST API:
//! - `GET /repos/{owner}/{repo}/releases/latest` for the newest release
//! - `GET /repos/{owner}/{repo}/git/matching-refs/tags/{pattern}` for tags
//! - plain `GET` of release asset URLs, streamed to a temporary file

mod error;

pub use error::{Error, Result};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use setup_mandrel_core::tools::{AssetFetcher, LatestRelease, ReleaseLookup, TagLookup, TagRef};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Default GitHub REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Environment variable naming the runner's temporary directory.
pub const RUNNER_TEMP_ENV: &str = "RUNNER_TEMP";

const USER_AGENT: &str = concat!("setup-mandrel/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`GitHubClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    /// REST API base URL, without trailing slash.
    pub api_url: String,
    /// Repository owner for release and tag lookups.
    pub owner: String,
    /// Bearer token; anonymous requests when `None`.
    pub token: Option<String>,
    /// Directory downloads are written to.
    pub download_dir: PathBuf,
}

impl GitHubConfig {
    /// Settings for `owner` on github.com, taking the token and download
    /// directory from the environment.
    #[must_use]
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            owner: owner.into(),
            token: token_from_env(),
            download_dir: default_download_dir(),
        }
    }

    /// Use a different API endpoint (GitHub Enterprise, test servers).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use an explicit token instead of the environment.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
        self
    }

    /// Write downloads into `dir`.
    #[must_use]
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// URL of the latest release of `repo`.
    #[must_use]
    pub fn latest_release_url(&self, repo: &str) -> String {
        format!(
            "{}/repos/{}/{repo}/releases/latest",
            self.api_url, self.owner
        )
    }

    /// URL listing tags of `repo` that start with `pattern`.
    #[must_use]
    pub fn matching_tags_url(&self, repo: &str, pattern: &str) -> String {
        format!(
            "{}/repos/{}/{repo}/git/matching-refs/tags/{pattern}",
            self.api_url, self.owner
        )
    }
}

/// Token from `GITHUB_TOKEN`, falling back to `GH_TOKEN`.
#[must_use]
pub fn token_from_env() -> Option<String> {
    ["GITHUB_TOKEN", "GH_TOKEN"]
        .into_iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|token| !token.trim().is_empty())
}

/// `$RUNNER_TEMP` when set, otherwise the system temporary directory.
#[must_use]
pub fn default_download_dir() -> PathBuf {
    std::env::var_os(RUNNER_TEMP_ENV)
        .filter(|v| !v.is_empty())
        .map_or_else(std::env::temp_dir, PathBuf::from)
}

/// GitHub REST client implementing the release, tag and asset collaborators.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    config: GitHubConfig,
    repo: String,
}

impl GitHubClient {
    /// Create a client for lookups in `config.owner`/`repo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(config: GitHubConfig, repo: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::Client)?;
        Ok(Self {
            client,
            config,
            repo: repo.into(),
        })
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(%url, "GitHub API request");
        let response = self
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| Error::request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::status(url, status));
        }

        let body = response.bytes().await.map_err(|e| Error::request(url, e))?;
        serde_json::from_slice(&body).map_err(|e| Error::decode(url, e))
    }

    /// Latest release of the configured repository.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or an
    /// unexpected payload.
    pub async fn fetch_latest_release(&self, repo: &str) -> Result<LatestRelease> {
        self.get_json(&self.config.latest_release_url(repo)).await
    }

    /// Tags of the configured repository starting with `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or an
    /// unexpected payload.
    pub async fn fetch_matching_tags(&self, pattern: &str) -> Result<Vec<TagRef>> {
        self.get_json(&self.config.matching_tags_url(&self.repo, pattern))
            .await
    }

    /// Stream `url` into a fresh file under the download directory.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or a failed
    /// write. A partially written file is removed.
    pub async fn download(&self, url: &str) -> Result<PathBuf> {
        let response = self.get(url).send().await.map_err(|e| Error::request(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::status(url, status));
        }

        let dir = &self.config.download_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::io(e, dir, "create"))?;
        let dest = dir.join(download_file_name(url));

        if let Err(e) = stream_to_file(response, url, &dest).await {
            let _ = tokio::fs::remove_file(&dest).await;
            return Err(e);
        }

        info!(%url, path = %dest.display(), "Downloaded asset");
        Ok(dest)
    }
}

/// Unique file name keeping the archive extension of `url`.
fn download_file_name(url: &str) -> String {
    let name = url
        .rsplit('/')
        .next()
        .and_then(|last| last.split(['?', '#']).next())
        .unwrap_or_default();
    let lower = name.to_ascii_lowercase();
    let extension = [".tar.gz", ".tgz", ".zip"]
        .into_iter()
        .find(|ext| lower.ends_with(ext))
        .unwrap_or_default();
    format!("{}{extension}", uuid::Uuid::new_v4())
}

async fn stream_to_file(response: reqwest::Response, url: &str, dest: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| Error::io(e, dest, "create"))?;

    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::request(url, e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::io(e, dest, "write"))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| Error::io(e, dest, "flush"))?;

    debug!(bytes = written, "Download complete");
    Ok(())
}

#[async_trait]
impl ReleaseLookup for GitHubClient {
    #[instrument(skip(self))]
    async fn latest_release(&self, repo: &str) -> setup_mandrel_core::Result<LatestRelease> {
        self.fetch_latest_release(repo)
            .await
            .map_err(Error::into_upstream)
    }
}

#[async_trait]
impl TagLookup for GitHubClient {
    #[instrument(skip(self))]
    async fn matching_tags(&self, pattern: &str) -> setup_mandrel_core::Result<Vec<TagRef>> {
        self.fetch_matching_tags(pattern)
            .await
            .map_err(Error::into_upstream)
    }
}

#[async_trait]
impl AssetFetcher for GitHubClient {
    async fn download_tool(&self, url: &str) -> setup_mandrel_core::Result<PathBuf> {
        self.download(url).await.map_err(|e| e.into_download(url))
    }
}
