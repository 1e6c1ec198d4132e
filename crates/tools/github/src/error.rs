//! Error types for GitHub API access

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for GitHub requests
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The HTTP client could not be built
    #[error("Failed to create HTTP client: {0}")]
    #[diagnostic(code(setup_mandrel::github::client))]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or its body could not be read
    #[error("Request to {url} failed: {source}")]
    #[diagnostic(
        code(setup_mandrel::github::request),
        help("Check network connectivity to GitHub")
    )]
    Request {
        /// Requested URL
        url: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// GitHub answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    #[diagnostic(
        code(setup_mandrel::github::status),
        help("Rate-limited requests succeed with a token; set GITHUB_TOKEN")
    )]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body was not the expected JSON shape
    #[error("Unexpected response from {url}: {message}")]
    #[diagnostic(code(setup_mandrel::github::decode))]
    Decode {
        /// Requested URL
        url: String,
        /// Decoder message
        message: String,
    },

    /// Writing a downloaded asset failed
    #[error("I/O {operation} failed: {}", path.display())]
    #[diagnostic(code(setup_mandrel::github::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// File being written
        path: Box<Path>,
        /// Operation that failed
        operation: String,
    },
}

impl Error {
    /// Create a request error
    #[must_use]
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    /// Create a status error
    #[must_use]
    pub fn status(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self::Status {
            url: url.into(),
            status: status.as_u16(),
        }
    }

    /// Create a decode error
    #[must_use]
    pub fn decode(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(source: std::io::Error, path: impl AsRef<Path>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.as_ref().into(),
            operation: operation.into(),
        }
    }

    /// Convert into the core error for a failed release or tag lookup.
    #[must_use]
    pub fn into_upstream(self) -> setup_mandrel_core::Error {
        setup_mandrel_core::Error::upstream_unavailable(self.to_string())
    }

    /// Convert into the core error for a failed asset download.
    #[must_use]
    pub fn into_download(self, url: &str) -> setup_mandrel_core::Error {
        let message = match &self {
            Self::Io { source, .. } => format!("{self}: {source}"),
            _ => self.to_string(),
        };
        setup_mandrel_core::Error::download(url, message)
    }
}

/// Result type for GitHub requests
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = Error::status(
            "https://api.github.com/repos/graalvm/mandrel/releases/latest",
            reqwest::StatusCode::FORBIDDEN,
        );
        assert_eq!(
            err.to_string(),
            "https://api.github.com/repos/graalvm/mandrel/releases/latest returned HTTP 403"
        );
    }

    #[test]
    fn test_into_upstream_keeps_message() {
        let err = Error::decode("https://x", "missing field `tag_name`").into_upstream();
        assert!(matches!(
            err,
            setup_mandrel_core::Error::UpstreamUnavailable { .. }
        ));
        assert!(err.to_string().contains("missing field `tag_name`"));
    }

    #[test]
    fn test_into_download_includes_io_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::StorageFull, "no space left");
        let err = Error::io(io, "/tmp/x", "write").into_download("https://host/a.tar.gz");
        let text = err.to_string();
        assert!(text.contains("https://host/a.tar.gz"), "{text}");
        assert!(text.contains("no space left"), "{text}");
    }
}
