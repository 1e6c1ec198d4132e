//! Directory-backed tool cache.
//!
//! Layout mirrors the hosted runner tool cache:
//!
//! ```text
//! <root>/<tool_name>/<version>/<arch>/          extracted toolchain
//! <root>/<tool_name>/<version>/<arch>.complete  completion marker
//! ```
//!
//! An entry without its marker is a leftover from an interrupted install and
//! is replaced on the next acquisition.

use async_trait::async_trait;
use setup_mandrel_core::ReleaseVersion;
use setup_mandrel_core::tools::{Arch, Os, PendingDownload, Platform, ToolCache};
use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::extract::{ArchiveKind, extract_toolchain};
use crate::{Error, Result};

/// Environment variable naming the hosted runner tool cache.
pub const TOOL_CACHE_ENV: &str = "RUNNER_TOOL_CACHE";

const MARKER_SUFFIX: &str = "complete";

/// Tool cache rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryToolCache {
    root: PathBuf,
    platform: Platform,
}

impl DirectoryToolCache {
    /// Create a cache rooted at `root` for toolchains built for `platform`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            root: root.into(),
            platform,
        }
    }

    /// Create a cache at the default location.
    ///
    /// Uses `$RUNNER_TOOL_CACHE` when set, otherwise the user cache directory.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no cache directory can be determined.
    pub fn from_env(platform: Platform) -> Result<Self> {
        Ok(Self::new(default_root()?, platform))
    }

    /// Root directory of the cache.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory an entry is (or would be) extracted into.
    #[must_use]
    pub fn entry_dir(&self, tool_name: &str, version: &str) -> PathBuf {
        self.version_dir(tool_name, version)
            .join(arch_dir_name(self.platform.arch))
    }

    /// Marker written once an entry is fully extracted.
    #[must_use]
    pub fn marker_path(&self, tool_name: &str, version: &str) -> PathBuf {
        self.version_dir(tool_name, version).join(format!(
            "{}.{MARKER_SUFFIX}",
            arch_dir_name(self.platform.arch)
        ))
    }

    /// Look up a complete entry and return its toolchain home.
    #[must_use]
    pub fn find(&self, tool_name: &str, version: &str) -> Option<PathBuf> {
        check_entry_names(tool_name, version).ok()?;
        let entry = self.entry_dir(tool_name, version);
        if entry.is_dir() && self.marker_path(tool_name, version).is_file() {
            Some(self.toolchain_home(entry))
        } else {
            None
        }
    }

    /// Versions of `tool_name` with a complete entry for this architecture,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the tool directory exists but cannot be read.
    pub fn list(&self, tool_name: &str) -> Result<Vec<String>> {
        let tool_dir = self.root.join(tool_name);
        let entries = match std::fs::read_dir(&tool_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(e, &tool_dir, "read")),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(e, &tool_dir, "read"))?;
            let Some(version) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if self.find(tool_name, &version).is_some() {
                versions.push(version);
            }
        }
        versions.sort_by(|a, b| compare_versions(a, b));
        Ok(versions)
    }

    /// Extract `archive` into the entry for `(tool_name, version)` and mark it
    /// complete.
    ///
    /// Extraction happens in a temporary sibling directory that is renamed
    /// into place, so a failure never leaves a half-written entry behind.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `tool_name` or `version` is not a
    /// single plain path component, otherwise an error if extraction, the
    /// rename or the marker write fails.
    pub fn store(
        &self,
        archive: &Path,
        kind: ArchiveKind,
        tool_name: &str,
        version: &str,
    ) -> Result<PathBuf> {
        check_entry_names(tool_name, version)?;
        let entry = self.entry_dir(tool_name, version);
        let marker = self.marker_path(tool_name, version);
        let version_dir = self.version_dir(tool_name, version);

        std::fs::create_dir_all(&version_dir)
            .map_err(|e| Error::io(e, &version_dir, "create"))?;

        // Clear leftovers of an interrupted install.
        remove_if_exists(&marker)?;
        remove_dir_if_exists(&entry)?;

        let staging = StagingDir::create(
            version_dir.join(format!(".{}.tmp", arch_dir_name(self.platform.arch))),
        )?;
        let extracted = extract_toolchain(archive, kind, staging.path())?;
        std::fs::rename(&extracted, &entry).map_err(|e| Error::io(e, &entry, "rename"))?;
        drop(staging);

        std::fs::write(&marker, b"").map_err(|e| Error::io(e, &marker, "write"))?;

        info!(tool = tool_name, %version, path = %entry.display(), "Cached toolchain");
        Ok(self.toolchain_home(entry))
    }

    fn version_dir(&self, tool_name: &str, version: &str) -> PathBuf {
        self.root.join(tool_name).join(version)
    }

    /// macOS JDK archives wrap the home in an app bundle layout.
    fn toolchain_home(&self, entry: PathBuf) -> PathBuf {
        if self.platform.os == Os::Macos {
            let bundled = entry.join("Contents").join("Home");
            if bundled.is_dir() {
                return bundled;
            }
        }
        entry
    }
}

#[async_trait]
impl ToolCache for DirectoryToolCache {
    #[instrument(skip_all, fields(tool = tool_name, version = version))]
    async fn download_extract_and_cache(
        &self,
        download: PendingDownload<'_>,
        tool_name: &str,
        version: &str,
    ) -> setup_mandrel_core::Result<PathBuf> {
        check_entry_names(tool_name, version)?;
        if let Some(home) = self.find(tool_name, version) {
            debug!(path = %home.display(), "Tool cache hit");
            return Ok(home);
        }

        info!(url = download.url(), "Tool cache miss, downloading");
        let archive = download.fetch().await?;

        let cache = self.clone();
        let staged_archive = archive.clone();
        let url = download.url().to_owned();
        let tool = tool_name.to_owned();
        let ver = version.to_owned();
        let stored = tokio::task::spawn_blocking(move || {
            let kind = ArchiveKind::detect(&staged_archive, Some(&url))?;
            cache.store(&staged_archive, kind, &tool, &ver)
        })
        .await
        .map_err(|e| setup_mandrel_core::Error::cache(format!("extraction task failed: {e}")))?;

        if let Err(e) = std::fs::remove_file(&archive) {
            warn!(archive = %archive.display(), error = %e, "Failed to remove downloaded archive");
        }

        Ok(stored?)
    }
}

/// Directory name used for an architecture, matching the hosted runner cache.
#[must_use]
pub const fn arch_dir_name(arch: Arch) -> &'static str {
    match arch {
        Arch::Amd64 => "x64",
        Arch::Aarch64 => "arm64",
    }
}

/// Default cache root: `$RUNNER_TOOL_CACHE`, else `<user cache>/setup-mandrel/tools`.
///
/// # Errors
///
/// Returns a configuration error if neither location is available.
pub fn default_root() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(TOOL_CACHE_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::cache_dir()
        .map(|dir| dir.join("setup-mandrel").join("tools"))
        .ok_or_else(|| {
            Error::configuration(format!(
                "no user cache directory available; set {TOOL_CACHE_ENV} or pass --cache-dir"
            ))
        })
}

/// Scratch directory for one extraction, removed on drop.
struct StagingDir(PathBuf);

impl StagingDir {
    fn create(path: PathBuf) -> Result<Self> {
        remove_dir_if_exists(&path)?;
        std::fs::create_dir_all(&path).map_err(|e| Error::io(e, &path, "create"))?;
        Ok(Self(path))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.0) {
            debug!(path = %self.0.display(), error = %e, "Failed to remove staging directory");
        }
    }
}

/// Entry names become directories under the root and must stay there.
fn check_entry_names(tool_name: &str, version: &str) -> Result<()> {
    for name in [tool_name, version] {
        let mut components = Path::new(name).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(part)), None) if part == name
        );
        if !single || name.contains(['/', '\\']) {
            return Err(Error::configuration(format!(
                "'{name}' is not a valid cache entry name"
            )));
        }
    }
    Ok(())
}

/// Release order for parseable versions, which sort after anything else.
fn compare_versions(a: &str, b: &str) -> Ordering {
    match (ReleaseVersion::parse(a), ReleaseVersion::parse(b)) {
        (Some(va), Some(vb)) => va.cmp(&vb).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(e, path, "remove")),
    }
}

fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(e, path, "remove")),
    }
}
