//! Build platform and architecture identification.
//!
//! Mandrel publishes one archive per `{platform}-{arch}` pair, named with the
//! GraalVM conventions (`linux`, `macos`, `windows` and `amd64`, `aarch64`).

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Platform identifier combining OS and architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    /// Create a new platform.
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Get the platform of the running host.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the host OS or architecture has no
    /// Mandrel build.
    pub fn current() -> Result<Self> {
        Ok(Self {
            os: Os::current()?,
            arch: Arch::current()?,
        })
    }

    /// Archive extension Mandrel uses on this platform.
    #[must_use]
    pub const fn archive_extension(&self) -> &'static str {
        match self.os {
            Os::Windows => ".zip",
            Os::Linux | Os::Macos => ".tar.gz",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Macos,
    Windows,
}

impl Os {
    /// Get the current OS.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on operating systems without a Mandrel build.
    pub fn current() -> Result<Self> {
        Self::parse(std::env::consts::OS).ok_or_else(|| {
            Error::configuration(format!(
                "Unsupported operating system: {}",
                std::env::consts::OS
            ))
        })
    }

    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linux" => Some(Self::Linux),
            "macos" | "darwin" | "osx" => Some(Self::Macos),
            "windows" | "win32" => Some(Self::Windows),
            _ => None,
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Macos => write!(f, "macos"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Amd64,
    Aarch64,
}

impl Arch {
    /// Get the current architecture.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on architectures without a Mandrel build.
    pub fn current() -> Result<Self> {
        Self::parse(std::env::consts::ARCH).ok_or_else(|| {
            Error::configuration(format!(
                "Unsupported architecture: {}",
                std::env::consts::ARCH
            ))
        })
    }

    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "amd64" | "x86_64" | "x64" => Some(Self::Amd64),
            "aarch64" | "arm64" => Some(Self::Aarch64),
            _ => None,
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amd64 => write!(f, "amd64"),
            Self::Aarch64 => write!(f, "aarch64"),
        }
    }
}
