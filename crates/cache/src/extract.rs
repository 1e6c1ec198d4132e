//! Archive extraction for downloaded toolchains.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::debug;

use crate::{Error, Result};

/// Archive formats the cache can unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// gzip-compressed tarball (`.tar.gz`, `.tgz`)
    TarGz,
    /// zip archive (`.zip`)
    Zip,
}

impl ArchiveKind {
    /// Detect the archive format from a file name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if lower.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }

    /// Detect the archive format from a path, falling back to the gzip magic
    /// bytes for downloads saved without an extension.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedArchive` if the format cannot be determined.
    pub fn detect(archive: &Path, hint: Option<&str>) -> Result<Self> {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(kind) = Self::from_name(&name) {
            return Ok(kind);
        }
        if let Some(kind) = hint.and_then(Self::from_name) {
            return Ok(kind);
        }

        let mut magic = [0u8; 4];
        let read = File::open(archive)
            .and_then(|mut f| std::io::Read::read(&mut f, &mut magic))
            .map_err(|e| Error::io(e, archive, "read"))?;
        match &magic[..read] {
            [0x1f, 0x8b, ..] => Ok(Self::TarGz),
            [b'P', b'K', 0x03, 0x04] => Ok(Self::Zip),
            _ => Err(Error::UnsupportedArchive { name }),
        }
    }
}

/// Unpack `archive` into `dest` and return the single top-level directory it
/// contained.
///
/// `dest` must exist and be empty.
///
/// # Errors
///
/// Returns an error if the archive cannot be read or does not hold exactly
/// one top-level directory.
pub fn extract_toolchain(archive: &Path, kind: ArchiveKind, dest: &Path) -> Result<PathBuf> {
    debug!(archive = %archive.display(), dest = %dest.display(), ?kind, "Extracting archive");

    match kind {
        ArchiveKind::TarGz => extract_tar_gz(archive, dest)?,
        ArchiveKind::Zip => extract_zip(archive, dest)?,
    }

    single_top_level_dir(dest)
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| Error::io(e, archive, "open"))?;
    let mut tar = Archive::new(GzDecoder::new(BufReader::new(file)));
    tar.set_preserve_permissions(true);
    tar.unpack(dest)
        .map_err(|e| Error::extraction(archive, e))
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| Error::io(e, archive, "open"))?;
    let mut zip =
        zip::ZipArchive::new(BufReader::new(file)).map_err(|e| Error::extraction(archive, e))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| Error::extraction(archive, e))?;

        // Entries escaping the destination are skipped.
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|e| Error::io(e, &outpath, "create"))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(e, parent, "create"))?;
        }
        let mut out = File::create(&outpath).map_err(|e| Error::io(e, &outpath, "create"))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| Error::io(e, &outpath, "write"))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                .map_err(|e| Error::io(e, &outpath, "chmod"))?;
        }
    }

    Ok(())
}

fn single_top_level_dir(dest: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dest)
        .map_err(|e| Error::io(e, dest, "read"))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::io(e, dest, "read"))?;

    match entries.as_slice() {
        [only] if only.path().is_dir() => Ok(only.path()),
        _ => Err(Error::UnexpectedLayout {
            found: entries.len(),
        }),
    }
}
