//! Error types for toolchain resolution and acquisition.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Result type for setup-mandrel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving and acquiring a toolchain.
///
/// Every variant is terminal for the invocation: nothing in the core retries
/// or recovers locally.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The version specifier was empty or otherwise unusable.
    #[error("Invalid version specifier '{specifier}'")]
    #[diagnostic(
        code(setup_mandrel::specifier::invalid),
        help("Use 'latest', a version prefix such as '23.1', or a full version such as '23.1.2.0-Final'")
    )]
    InvalidSpecifier {
        /// The raw specifier as supplied.
        specifier: String,
    },

    /// The latest upstream release is not tagged under the expected namespace.
    #[error("Could not find latest Mandrel release: {tag}")]
    #[diagnostic(
        code(setup_mandrel::upstream::malformed_tag),
        help("The upstream repository returned a release outside the expected tag namespace")
    )]
    MalformedUpstreamTag {
        /// The offending tag name.
        tag: String,
    },

    /// No release matched the requested version prefix.
    #[error("Unable to find the latest Mandrel version starting with '{prefix}'")]
    #[diagnostic(
        code(setup_mandrel::version::not_found),
        help("Please make sure the version is set correctly")
    )]
    VersionNotFound {
        /// The requested version prefix.
        prefix: String,
    },

    /// The release or tag listing service could not be reached.
    #[error("Upstream release lookup failed: {message}")]
    #[diagnostic(code(setup_mandrel::upstream::unavailable))]
    UpstreamUnavailable {
        /// Description of the transport failure.
        message: String,
    },

    /// Downloading, extracting or caching the artifact failed.
    #[error("Failed to acquire Mandrel {version} (requested '{specifier}'): {message}")]
    #[diagnostic(code(setup_mandrel::acquire::failed))]
    AcquisitionFailed {
        /// The specifier the caller asked for.
        specifier: String,
        /// The version it resolved to.
        version: String,
        /// Description of the collaborator failure.
        message: String,
    },

    /// The raw artifact download failed.
    #[error("Failed to download {url}: {message}")]
    #[diagnostic(code(setup_mandrel::download))]
    Download {
        /// The URL being downloaded.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// The tool cache could not extract or store an artifact.
    #[error("Tool cache error: {message}")]
    #[diagnostic(code(setup_mandrel::cache))]
    Cache {
        /// Description of the failure.
        message: String,
    },

    /// Invalid configuration value.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(setup_mandrel::config))]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// I/O error outside of the cache collaborator.
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(setup_mandrel::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available.
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write", "append").
        operation: String,
    },
}

impl Error {
    /// Create an invalid specifier error.
    #[must_use]
    pub fn invalid_specifier(specifier: impl Into<String>) -> Self {
        Self::InvalidSpecifier {
            specifier: specifier.into(),
        }
    }

    /// Create a malformed upstream tag error.
    #[must_use]
    pub fn malformed_upstream_tag(tag: impl Into<String>) -> Self {
        Self::MalformedUpstreamTag { tag: tag.into() }
    }

    /// Create a version not found error.
    #[must_use]
    pub fn version_not_found(prefix: impl Into<String>) -> Self {
        Self::VersionNotFound {
            prefix: prefix.into(),
        }
    }

    /// Create an upstream unavailable error.
    #[must_use]
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Create an acquisition failed error.
    #[must_use]
    pub fn acquisition_failed(
        specifier: impl Into<String>,
        version: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::AcquisitionFailed {
            specifier: specifier.into(),
            version: version.into(),
            message: message.into(),
        }
    }

    /// Create a download error.
    #[must_use]
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a tool cache error.
    #[must_use]
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with path context.
    #[must_use]
    pub fn io(source: std::io::Error, path: &Path, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
            operation: operation.into(),
        }
    }

    /// Whether the failure happened before any download was attempted.
    #[must_use]
    pub const fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSpecifier { .. }
                | Self::MalformedUpstreamTag { .. }
                | Self::VersionNotFound { .. }
                | Self::UpstreamUnavailable { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: None,
            operation: "operation".to_string(),
        }
    }
}
