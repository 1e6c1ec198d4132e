//! Command-line parsing, error categories and exit codes.

use crate::tracing::TracingFormat;
use clap::{Parser, Subcommand};
use miette::{Diagnostic, Report};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Resolution or acquisition error exit code
pub const EXIT_SETUP: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(setup_mandrel::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Version resolution failed (exit code 3)
    #[error("{message}")]
    #[diagnostic(code(setup_mandrel::cli::resolve))]
    Resolve {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Download, extraction or export failed (exit code 3)
    #[error("{message}")]
    #[diagnostic(code(setup_mandrel::cli::acquire))]
    Acquire {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Short machine-readable category for JSON output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Resolve { .. } => "resolve",
            Self::Acquire { .. } => "acquire",
        }
    }
}

/// Convert `setup_mandrel_core::Error` to the matching `CliError` category.
///
/// - Invalid input and configuration -> Config (exit code 2)
/// - Lookup failures -> Resolve (exit code 3)
/// - Download, cache and I/O failures -> Acquire (exit code 3)
impl From<setup_mandrel_core::Error> for CliError {
    fn from(err: setup_mandrel_core::Error) -> Self {
        use setup_mandrel_core::Error;

        let help = err.help().map(|h| h.to_string());
        match err {
            Error::Configuration { message } => Self::Config { message, help },
            Error::InvalidSpecifier { .. } => Self::Config {
                message: err.to_string(),
                help,
            },
            Error::MalformedUpstreamTag { .. }
            | Error::VersionNotFound { .. }
            | Error::UpstreamUnavailable { .. } => Self::Resolve {
                message: err.to_string(),
                help,
            },
            Error::Io {
                ref source,
                ref path,
                ref operation,
            } => {
                let path_str = path
                    .as_ref()
                    .map_or(String::new(), |p| format!(" on {}", p.display()));
                Self::Acquire {
                    message: format!("I/O {operation} failed{path_str}: {source}"),
                    help,
                }
            }
            Error::AcquisitionFailed { .. } | Error::Download { .. } | Error::Cache { .. } => {
                Self::Acquire {
                    message: err.to_string(),
                    help,
                }
            }
        }
    }
}

impl From<setup_mandrel_cache::Error> for CliError {
    fn from(err: setup_mandrel_cache::Error) -> Self {
        match err {
            setup_mandrel_cache::Error::Configuration { message } => {
                Self::config_with_help(message, "Pass --cache-dir to choose a location")
            }
            other => setup_mandrel_core::Error::from(other).into(),
        }
    }
}

impl From<setup_mandrel_github::Error> for CliError {
    fn from(err: setup_mandrel_github::Error) -> Self {
        Self::config(err.to_string())
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Resolve { .. } | CliError::Acquire { .. } => EXIT_SETUP,
    }
}

/// Render an error as a miette report, or as a JSON envelope on stdout.
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let envelope = ErrorEnvelope::new(serde_json::json!({
            "code": err.kind(),
            "message": err.to_string(),
        }));
        match serde_json::to_string(&envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct OkEnvelope<T> {
    /// Always "ok"
    pub status: &'static str,
    /// The command result
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Wrap a command result
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope<E> {
    /// Always "error"
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Wrap error details
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Install Mandrel toolchains by version prefix, exact version or `latest`.
#[derive(Parser, Debug)]
#[command(name = "setup-mandrel")]
#[command(about = "Resolve, download and activate Mandrel toolchains")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Target operating system (linux, macos, windows); defaults to the host.
    #[arg(long, global = true, value_name = "OS")]
    pub platform: Option<String>,

    /// Target architecture (amd64, aarch64); defaults to the host.
    #[arg(long, global = true, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Tool cache root; defaults to $RUNNER_TOOL_CACHE or the user cache.
    #[arg(long, global = true, env = "RUNNER_TOOL_CACHE", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Token for GitHub API requests.
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub REST API endpoint.
    #[arg(
        long,
        global = true,
        env = "GITHUB_API_URL",
        default_value = setup_mandrel_github::DEFAULT_API_URL
    )]
    pub api_url: String,

    /// Base URL release assets are downloaded from.
    #[arg(long, global = true, value_name = "URL")]
    pub download_base: Option<String>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = TracingFormat::Pretty)]
    pub log_format: TracingFormat,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print results as a JSON envelope.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve, download (or reuse) and activate a toolchain.
    Install {
        /// Version specifier: `latest`, a prefix like `23.1`, or a full version.
        #[arg(default_value = setup_mandrel_core::version::LATEST)]
        version: String,

        /// Java feature version of the build (e.g. 17, 21).
        #[arg(long, short = 'j')]
        java_version: String,

        /// Require a workflow environment. GRAALVM_HOME, JAVA_HOME and PATH
        /// are written whenever GITHUB_ENV and GITHUB_PATH are set; with this
        /// flag their absence is a configuration error.
        #[arg(long)]
        export: bool,
    },

    /// Print the fully-qualified version a specifier resolves to.
    Resolve {
        /// Version specifier: `latest`, a prefix like `23.1`, or a full version.
        #[arg(default_value = setup_mandrel_core::version::LATEST)]
        version: String,
    },

    /// Print artifact coordinates without downloading.
    Locate {
        /// Version specifier: `latest`, a prefix like `23.1`, or a full version.
        #[arg(default_value = setup_mandrel_core::version::LATEST)]
        version: String,

        /// Java feature version of the build (e.g. 17, 21).
        #[arg(long, short = 'j')]
        java_version: String,
    },

    /// List cached versions of a toolchain.
    List {
        /// Java feature version of the build (e.g. 17, 21).
        #[arg(long, short = 'j')]
        java_version: String,
    },
}

/// Parse command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use setup_mandrel_core::Error;

    fn parse_from(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_install_defaults_to_latest() {
        let cli = parse_from(&["setup-mandrel", "install", "--java-version", "21"]);
        assert_eq!(
            cli.command,
            Commands::Install {
                version: "latest".to_string(),
                java_version: "21".to_string(),
                export: false,
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse_from(&[
            "setup-mandrel",
            "locate",
            "23.1",
            "-j",
            "17",
            "--platform",
            "macos",
            "--arch",
            "aarch64",
            "-vv",
        ]);
        assert_eq!(cli.platform.as_deref(), Some("macos"));
        assert_eq!(cli.arch.as_deref(), Some("aarch64"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_java_version_is_required_for_install() {
        assert!(Cli::try_parse_from(["setup-mandrel", "install", "23.1"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["setup-mandrel", "resolve", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let code = |e: Error| exit_code_for(&CliError::from(e));
        assert_eq!(code(Error::configuration("bad arch")), EXIT_CLI);
        assert_eq!(code(Error::invalid_specifier("")), EXIT_CLI);
        assert_eq!(code(Error::version_not_found("9.9")), EXIT_SETUP);
        assert_eq!(code(Error::malformed_upstream_tag("x")), EXIT_SETUP);
        assert_eq!(code(Error::acquisition_failed("1", "1", "x")), EXIT_SETUP);
    }

    #[test]
    fn test_conversion_keeps_help() {
        let err = CliError::from(Error::version_not_found("9.9"));
        match err {
            CliError::Resolve { message, help } => {
                assert!(message.contains("'9.9'"));
                assert!(help.is_some());
            }
            other => panic!("expected Resolve, got {other:?}"),
        }
    }

    #[test]
    fn test_error_envelope_shape() {
        let err = CliError::config("bad");
        let json = serde_json::to_value(ErrorEnvelope::new(serde_json::json!({
            "code": err.kind(),
        })))
        .unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"]["code"], "config");
    }
}
