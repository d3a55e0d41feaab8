//! The release compatibility table.
//!
//! Each include-what-you-use release is built against one clang version and
//! expects that version's resource directory at `lib/clang/<version>.0`.
//! Releases also differ in install topology and in what the analyzer's exit
//! code means.

use serde::Serialize;

use super::layout::LayoutVariant;
use super::version::ToolchainVersion;

/// How a release's analyzer encodes its result in the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitConvention {
    /// Exit code is the number of suggested edits plus 2.
    PlusTwo,
    /// Exit code is always 1 once the analysis ran; the report text carries
    /// the details.
    Legacy,
}

impl ExitConvention {
    /// The exit code an analyzer should produce for `suggestions` edits.
    pub fn expected_analyzer_exit(self, suggestions: u32) -> i32 {
        match self {
            ExitConvention::PlusTwo => {
                i32::try_from(suggestions).unwrap_or(i32::MAX - 2).saturating_add(2)
            }
            ExitConvention::Legacy => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExitConvention::PlusTwo => "plus-two",
            ExitConvention::Legacy => "legacy",
        }
    }
}

/// A release of the tool being installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolRelease {
    /// Release version of include-what-you-use (e.g. "0.7")
    pub tool_version: &'static str,
    /// clang `major.minor` the release was built against (e.g. "3.9")
    pub required_library_version: &'static str,
    /// Oldest host toolchain the release can be installed against
    pub minimum_toolchain: ToolchainVersion,
    pub layout: LayoutVariant,
    pub exit_convention: ExitConvention,
}

impl ToolRelease {
    /// Directory name the runtime loader looks for under `lib/clang`.
    ///
    /// Always `<major.minor>.0`, whatever patch level the host has.
    pub fn library_dir_name(&self) -> String {
        format!("{}.0", self.required_library_version)
    }
}

/// Supported releases, oldest first.
pub static RELEASES: &[ToolRelease] = &[
    ToolRelease {
        tool_version: "0.3",
        required_library_version: "3.5",
        minimum_toolchain: ToolchainVersion::new(3, 5, 0),
        layout: LayoutVariant::Flat,
        exit_convention: ExitConvention::Legacy,
    },
    ToolRelease {
        tool_version: "0.4",
        required_library_version: "3.6",
        minimum_toolchain: ToolchainVersion::new(3, 6, 0),
        layout: LayoutVariant::Flat,
        exit_convention: ExitConvention::Legacy,
    },
    ToolRelease {
        tool_version: "0.5",
        required_library_version: "3.7",
        minimum_toolchain: ToolchainVersion::new(3, 7, 0),
        layout: LayoutVariant::Nested,
        exit_convention: ExitConvention::PlusTwo,
    },
    ToolRelease {
        tool_version: "0.6",
        required_library_version: "3.8",
        minimum_toolchain: ToolchainVersion::new(3, 8, 0),
        layout: LayoutVariant::Nested,
        exit_convention: ExitConvention::PlusTwo,
    },
    ToolRelease {
        tool_version: "0.7",
        required_library_version: "3.9",
        minimum_toolchain: ToolchainVersion::new(3, 9, 0),
        layout: LayoutVariant::Nested,
        exit_convention: ExitConvention::PlusTwo,
    },
];

/// The release installed when none is requested.
pub const DEFAULT_RELEASE: &str = "0.7";

/// Look up a release by its version string.
pub fn find_release(tool_version: &str) -> Option<&'static ToolRelease> {
    RELEASES.iter().find(|r| r.tool_version == tool_version)
}
