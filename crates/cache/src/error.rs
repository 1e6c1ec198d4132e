//! Error types for the tool cache

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for tool cache operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error during cache operations
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(setup_mandrel::cache::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "rename", "create")
        operation: String,
    },

    /// The downloaded file is not an archive format the cache understands
    #[error("Unsupported archive format: {name}")]
    #[diagnostic(
        code(setup_mandrel::cache::unsupported_archive),
        help("Supported formats are .tar.gz, .tgz and .zip")
    )]
    UnsupportedArchive {
        /// File name of the archive
        name: String,
    },

    /// The archive could not be read
    #[error("Failed to extract {}: {message}", path.display())]
    #[diagnostic(code(setup_mandrel::cache::extract))]
    Extraction {
        /// Path of the archive
        path: Box<Path>,
        /// Error message from the archive reader
        message: String,
    },

    /// The archive does not contain exactly one top-level directory
    #[error("Unexpected archive layout: expected a single top-level directory, found {found}")]
    #[diagnostic(code(setup_mandrel::cache::layout))]
    UnexpectedLayout {
        /// Number of top-level entries found
        found: usize,
    },

    /// Configuration or validation error
    #[error("Tool cache configuration error: {message}")]
    #[diagnostic(code(setup_mandrel::cache::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create an extraction error
    #[must_use]
    pub fn extraction(path: impl AsRef<Path>, message: impl ToString) -> Self {
        Self::Extraction {
            path: path.as_ref().into(),
            message: message.to_string(),
        }
    }
}

impl From<Error> for setup_mandrel_core::Error {
    fn from(err: Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::cache(message)
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, Error>;
