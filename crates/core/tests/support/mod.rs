//! In-memory collaborators for resolver and orchestrator tests.

#![allow(dead_code)]

use async_trait::async_trait;
use setup_mandrel_core::tools::{
    Arch, AssetFetcher, LatestRelease, Os, PendingDownload, Platform, ReleaseLookup, TagLookup,
    TagRef, ToolCache,
};
use setup_mandrel_core::{Error, Result, ToolchainConfig};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn linux_amd64() -> ToolchainConfig {
    ToolchainConfig::mandrel(Platform::new(Os::Linux, Arch::Amd64))
}

/// Fixed upstream snapshot that counts every lookup.
#[derive(Default)]
pub struct FakeUpstream {
    pub latest_tag: Option<String>,
    pub tags: Vec<String>,
    pub fail: bool,
    pub latest_calls: AtomicUsize,
    pub tag_calls: AtomicUsize,
    pub patterns: Mutex<Vec<String>>,
}

impl FakeUpstream {
    pub fn with_latest(tag: &str) -> Self {
        Self {
            latest_tag: Some(tag.to_string()),
            ..Self::default()
        }
    }

    pub fn with_tags(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst) + self.tag_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseLookup for FakeUpstream {
    async fn latest_release(&self, _repo: &str) -> Result<LatestRelease> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::upstream_unavailable("connection refused"));
        }
        let tag_name = self
            .latest_tag
            .clone()
            .ok_or_else(|| Error::upstream_unavailable("no releases"))?;
        Ok(LatestRelease { tag_name })
    }
}

#[async_trait]
impl TagLookup for FakeUpstream {
    async fn matching_tags(&self, pattern: &str) -> Result<Vec<TagRef>> {
        self.tag_calls.fetch_add(1, Ordering::SeqCst);
        self.patterns.lock().unwrap().push(pattern.to_string());
        if self.fail {
            return Err(Error::upstream_unavailable("connection refused"));
        }
        Ok(self
            .tags
            .iter()
            .filter(|t| t.starts_with(pattern))
            .map(|t| TagRef::new(format!("refs/tags/{t}")))
            .collect())
    }
}

/// Fetcher that records URLs and pretends to write an archive.
#[derive(Default)]
pub struct RecordingFetcher {
    pub urls: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl AssetFetcher for RecordingFetcher {
    async fn download_tool(&self, url: &str) -> Result<PathBuf> {
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(Error::download(url, "HTTP 404 Not Found"));
        }
        Ok(PathBuf::from("/tmp/download").join(url.rsplit('/').next().unwrap_or("archive")))
    }
}

/// Cache keyed by (tool name, version) that only fetches on a miss.
#[derive(Default)]
pub struct MemoryCache {
    pub entries: Mutex<HashMap<(String, String), PathBuf>>,
    pub fetches: AtomicUsize,
}

impl MemoryCache {
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolCache for MemoryCache {
    async fn download_extract_and_cache(
        &self,
        download: PendingDownload<'_>,
        tool_name: &str,
        version: &str,
    ) -> Result<PathBuf> {
        let key = (tool_name.to_string(), version.to_string());
        if let Some(path) = self.entries.lock().unwrap().get(&key) {
            return Ok(path.clone());
        }

        self.fetches.fetch_add(1, Ordering::SeqCst);
        download.fetch().await?;
        let home = PathBuf::from("/opt/hostedtoolcache")
            .join(tool_name)
            .join(version)
            .join("x64");
        self.entries.lock().unwrap().insert(key, home.clone());
        Ok(home)
    }
}
