//! GitHub Actions environment export.
//!
//! Workflow steps pass variables to later steps by appending to the files
//! named by `GITHUB_ENV` and `GITHUB_PATH`.

use setup_mandrel_core::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File collecting environment variables for later workflow steps.
pub const GITHUB_ENV: &str = "GITHUB_ENV";

/// File collecting `PATH` entries for later workflow steps.
pub const GITHUB_PATH: &str = "GITHUB_PATH";

/// Variables pointing at the toolchain home.
pub const HOME_VARIABLES: [&str; 2] = ["GRAALVM_HOME", "JAVA_HOME"];

/// Targets of a workflow export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionsEnv {
    /// Destination for `NAME=value` entries
    pub env_file: Option<PathBuf>,
    /// Destination for `PATH` entries
    pub path_file: Option<PathBuf>,
}

impl ActionsEnv {
    /// Read the file locations from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let file = |name| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            env_file: file(GITHUB_ENV),
            path_file: file(GITHUB_PATH),
        }
    }

    /// Whether the process runs inside a workflow step.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.env_file.is_some() || self.path_file.is_some()
    }

    /// Export `home` as `GRAALVM_HOME`/`JAVA_HOME` and put `bin_dir` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be appended to or a value contains a
    /// newline.
    pub fn export_toolchain(&self, home: &Path, bin_dir: &Path) -> Result<()> {
        let home = path_value(home)?;
        let bin = path_value(bin_dir)?;

        if let Some(env_file) = &self.env_file {
            let mut entries = String::new();
            for name in HOME_VARIABLES {
                entries.push_str(&format!("{name}={home}\n"));
            }
            append(env_file, &entries)?;
            info!(file = %env_file.display(), %home, "Exported toolchain home");
        } else {
            debug!("{GITHUB_ENV} not set, skipping variable export");
        }

        if let Some(path_file) = &self.path_file {
            append(path_file, &format!("{bin}\n"))?;
            info!(file = %path_file.display(), path = %bin, "Added toolchain to PATH");
        } else {
            debug!("{GITHUB_PATH} not set, skipping PATH export");
        }

        Ok(())
    }
}

fn path_value(path: &Path) -> Result<String> {
    let value = path.to_string_lossy();
    if value.contains(['\n', '\r']) {
        return Err(Error::configuration(format!(
            "Cannot export path containing a newline: {value:?}"
        )));
    }
    Ok(value.into_owned())
}

fn append(file: &Path, contents: &str) -> Result<()> {
    let mut handle = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .map_err(|e| Error::io(e, file, "open"))?;
    handle
        .write_all(contents.as_bytes())
        .map_err(|e| Error::io(e, file, "append"))
}
