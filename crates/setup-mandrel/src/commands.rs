//! Command execution.
//!
//! Each command produces a [`CommandOutput`]: a line for humans and a JSON
//! value for `--json`.

use crate::cli::{Cli, CliError, Commands};
use crate::export::ActionsEnv;
use serde::Serialize;
use setup_mandrel_cache::DirectoryToolCache;
use setup_mandrel_core::artifact::tool_name;
use setup_mandrel_core::tools::{Arch, Os, Platform};
use setup_mandrel_core::{ArtifactCoordinates, MandrelSetup, ToolchainConfig, VersionResolver};
use setup_mandrel_github::{GitHubClient, GitHubConfig};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Result of a command, rendered as text or JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    /// What is printed on stdout in text mode
    pub text: String,
    /// What is wrapped in the JSON envelope
    pub data: serde_json::Value,
}

impl CommandOutput {
    fn new(text: impl Into<String>, data: &impl Serialize) -> Result<Self, CliError> {
        Ok(Self {
            text: text.into(),
            data: serde_json::to_value(data)
                .map_err(|e| CliError::config(format!("Failed to serialize output: {e}")))?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Installed<'a> {
    #[serde(flatten)]
    coordinates: &'a ArtifactCoordinates,
    home: &'a std::path::Path,
    exported: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Listed<'a> {
    tool_name: &'a str,
    versions: &'a [String],
}

/// Build the toolchain configuration from platform overrides.
///
/// # Errors
///
/// Returns a configuration error for unknown platform names, or when the host
/// platform is unsupported and no override is given.
pub fn toolchain_config(cli: &Cli) -> Result<ToolchainConfig, CliError> {
    let os = match cli.platform.as_deref() {
        Some(name) => Os::parse(name).ok_or_else(|| {
            CliError::config_with_help(
                format!("Unknown platform '{name}'"),
                "Use one of: linux, macos, windows",
            )
        })?,
        None => Os::current()?,
    };
    let arch = match cli.arch.as_deref() {
        Some(name) => Arch::parse(name).ok_or_else(|| {
            CliError::config_with_help(
                format!("Unknown architecture '{name}'"),
                "Use one of: amd64, aarch64",
            )
        })?,
        None => Arch::current()?,
    };

    let mut config = ToolchainConfig::mandrel(Platform::new(os, arch));
    if let Some(base) = &cli.download_base {
        config = config.with_download_base(base.clone());
    }
    Ok(config)
}

fn github_client(cli: &Cli, config: &ToolchainConfig) -> Result<GitHubClient, CliError> {
    let github = GitHubConfig::new(config.owner.clone())
        .with_api_url(cli.api_url.clone())
        .with_token(cli.github_token.clone());
    Ok(GitHubClient::new(github, config.repo.clone())?)
}

fn tool_cache(cli: &Cli, platform: Platform) -> Result<DirectoryToolCache, CliError> {
    match &cli.cache_dir {
        Some(dir) => Ok(DirectoryToolCache::new(dir.clone(), platform)),
        None => Ok(DirectoryToolCache::from_env(platform)?),
    }
}

fn setup(cli: &Cli, config: ToolchainConfig) -> Result<MandrelSetup, CliError> {
    let github = Arc::new(github_client(cli, &config)?);
    let cache = Arc::new(tool_cache(cli, config.platform)?);
    debug!(cache = %cache.root().display(), "Using tool cache");
    Ok(MandrelSetup::new(
        config,
        github.clone(),
        github.clone(),
        github,
        cache,
    ))
}

/// Run the parsed command line.
///
/// # Errors
///
/// Returns the command's error mapped to its CLI category.
#[instrument(skip_all, fields(command = ?cli.command))]
pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let config = toolchain_config(cli)?;

    match &cli.command {
        Commands::Install {
            version,
            java_version,
            export,
        } => {
            let actions = ActionsEnv::from_env();
            if *export && !actions.is_active() {
                return Err(CliError::config_with_help(
                    "--export needs a workflow environment",
                    "Set GITHUB_ENV and GITHUB_PATH, or drop --export",
                ));
            }

            let installed = setup(cli, config)?.install(version, java_version).await?;
            let exported = actions.is_active();
            if exported {
                actions.export_toolchain(&installed.home, &installed.bin_dir())?;
            }

            CommandOutput::new(
                installed.home.display().to_string(),
                &Installed {
                    coordinates: &installed.coordinates,
                    home: &installed.home,
                    exported,
                },
            )
        }
        Commands::Resolve { version } => {
            let github = github_client(cli, &config)?;
            let resolved = VersionResolver::new(&config, &github, &github)
                .resolve_str(version)
                .await?;
            CommandOutput::new(
                resolved.clone(),
                &serde_json::json!({ "version": resolved }),
            )
        }
        Commands::Locate {
            version,
            java_version,
        } => {
            let github = github_client(cli, &config)?;
            let resolved = VersionResolver::new(&config, &github, &github)
                .resolve_str(version)
                .await?;
            let coordinates = ArtifactCoordinates::new(&config, &resolved, java_version);
            CommandOutput::new(locate_text(&coordinates), &coordinates)
        }
        Commands::List { java_version } => {
            let name = tool_name(&config, java_version);
            let versions = tool_cache(cli, config.platform)?.list(&name)?;
            CommandOutput::new(
                versions.join("\n"),
                &Listed {
                    tool_name: &name,
                    versions: &versions,
                },
            )
        }
    }
}

fn locate_text(coordinates: &ArtifactCoordinates) -> String {
    format!(
        "version: {}\nidentifier: {}\ntool: {}\nurl: {}",
        coordinates.version, coordinates.identifier, coordinates.tool_name, coordinates.download_url
    )
}
