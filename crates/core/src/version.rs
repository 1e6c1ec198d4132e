//! Version specifiers and release version ordering.
//!
//! A user-supplied specifier is classified exactly once into a
//! [`VersionSpecifier`]; every later decision matches on that value instead of
//! counting dots again.
//!
//! Mandrel versions carry four numeric components (`23.1.2.0`), which plain
//! semantic versioning rejects, so [`ReleaseVersion`] accepts any number of
//! numeric components from three upwards and delegates pre-release precedence
//! to [`semver::Prerelease`].

use semver::Prerelease;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// The keyword requesting the most recent upstream release.
pub const LATEST: &str = "latest";

/// Number of dots from which a specifier is taken verbatim.
const FULLY_QUALIFIED_DOTS: usize = 3;

/// A classified version request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSpecifier {
    /// The most recent upstream release.
    Latest,
    /// A dotted prefix with at most two dots, e.g. "23" or "21.3".
    Prefix(String),
    /// A complete version, used as-is, e.g. "23.1.2.0" or "21.3.0.0-Final".
    FullyQualified(String),
}

impl VersionSpecifier {
    /// Classify a raw specifier.
    ///
    /// Surrounding whitespace is ignored and a leading `tag_prefix`
    /// (e.g. "mandrel-") is stripped, so "mandrel-latest" and "latest" are
    /// the same request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpecifier` when nothing is left after trimming, or when
    /// the version contains a path separator or `..`.
    pub fn classify(raw: &str, tag_prefix: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let version = if tag_prefix.is_empty() {
            trimmed
        } else {
            trimmed.strip_prefix(tag_prefix).unwrap_or(trimmed)
        };

        if version.is_empty() {
            return Err(Error::invalid_specifier(raw));
        }
        if version == LATEST {
            return Ok(Self::Latest);
        }

        // Versions name cache directories.
        if version.contains(['/', '\\']) || version.contains("..") {
            return Err(Error::invalid_specifier(raw));
        }

        let dots = version.matches('.').count();
        if dots < FULLY_QUALIFIED_DOTS {
            Ok(Self::Prefix(version.to_string()))
        } else {
            Ok(Self::FullyQualified(version.to_string()))
        }
    }

    /// Whether resolving this specifier needs an upstream lookup.
    #[must_use]
    pub const fn needs_lookup(&self) -> bool {
        !matches!(self, Self::FullyQualified(_))
    }

    /// The specifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Latest => LATEST,
            Self::Prefix(v) | Self::FullyQualified(v) => v,
        }
    }
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A release version with at least `major.minor.patch` numeric components.
///
/// Ordering compares numeric components left to right (a version that runs
/// out of components first is lower), then pre-release identifiers with
/// semantic versioning precedence. Build metadata after `+` is kept for
/// display but ignored for ordering.
#[derive(Debug, Clone)]
pub struct ReleaseVersion {
    components: Vec<u64>,
    pre: Prerelease,
    raw: String,
}

impl ReleaseVersion {
    /// Parse a release version, returning `None` if it is not valid.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let without_build = s.split_once('+').map_or(s, |(v, _)| v);
        let (numbers, pre) = match without_build.split_once('-') {
            Some((numbers, pre)) if !pre.is_empty() => (numbers, Prerelease::new(pre).ok()?),
            Some(_) => return None,
            None => (without_build, Prerelease::EMPTY),
        };

        let components = numbers
            .split('.')
            .map(parse_component)
            .collect::<Option<Vec<_>>>()?;
        if components.len() < FULLY_QUALIFIED_DOTS {
            return None;
        }

        Some(Self {
            components,
            pre,
            raw: s.to_string(),
        })
    }

    /// Numeric components, major first.
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Pre-release part, empty for a final release.
    #[must_use]
    pub const fn pre(&self) -> &Prerelease {
        &self.pre
    }

    /// The version text as parsed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// A numeric identifier: ASCII digits without a leading zero.
fn parse_component(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if part.len() > 1 && part.starts_with('0') {
        return None;
    }
    part.parse().ok()
}

impl FromStr for ReleaseVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::invalid_specifier(s))
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components
            .cmp(&other.components)
            .then_with(|| self.pre.cmp(&other.pre))
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ReleaseVersion {}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
