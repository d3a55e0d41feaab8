//! Host toolchain version numbers.
//!
//! Compiler banners come in many shapes:
//!
//! ```text
//! clang version 3.9.1 (tags/RELEASE_391/final)
//! Ubuntu clang version 3.9.1-4ubuntu3~16.04.2 (tags/RELEASE_391/rc2)
//! Apple LLVM version 8.0.0 (clang-800.0.42.1)
//! ```
//!
//! [`ToolchainVersion::from_banner`] pulls the first dotted version token out
//! of such text; [`str::parse`] accepts only a bare `major.minor[.patch]`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use serde::{Serialize, Serializer};

static VERSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d.])(\d+)\.(\d+)(?:\.(\d+))?").expect("version token regex is valid")
});

/// A `major.minor.patch` toolchain version. A missing patch reads as `0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolchainVersion(Version);

impl ToolchainVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        ToolchainVersion(Version::new(major, minor, patch))
    }

    /// Extract the first dotted version from free-form banner text.
    pub fn from_banner(banner: &str) -> Option<Self> {
        let caps = VERSION_TOKEN.captures(banner)?;
        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = caps.get(2)?.as_str().parse().ok()?;
        let patch = match caps.get(3) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        Some(ToolchainVersion::new(major, minor, patch))
    }

    /// `"3.9"` for 3.9.1.
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.0.major, self.0.minor)
    }

    /// Whether this version shares `major.minor` with a `"3.9"`-style string.
    pub fn matches_major_minor(&self, major_minor: &str) -> bool {
        self.major_minor() == major_minor
    }
}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ToolchainVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error parsing a bare version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionParseError(pub String);

impl fmt::Display for VersionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid version '{}', expected major.minor or major.minor.patch",
            self.0
        )
    }
}

impl std::error::Error for VersionParseError {}

impl FromStr for ToolchainVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError(s.to_string());
        let parts: Vec<&str> = s.trim().split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(err());
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| err())?;
        }

        Ok(ToolchainVersion::new(numbers[0], numbers[1], numbers[2]))
    }
}
