//! Layout resolution.
//!
//! Maps a release and a discovered toolchain to the concrete steps that
//! build an installation. The resolver is pure and deterministic: it never
//! touches the filesystem, so two calls with equal inputs yield equal
//! mappings, and missing host directories only surface at build time.

pub mod errors;

pub use errors::{lookup_release, ResolveError};

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::{EntryPoints, LayoutVariant, Location, MappingEntry, PathMapping, ToolRelease};
use crate::toolchain::ToolchainInfo;

/// Analyzer binary name inside the bundle and the install tree.
pub const ANALYZER_BINARY: &str = "include-what-you-use";
/// Short alias for the analyzer.
pub const ANALYZER_ALIAS: &str = "iwyu";
/// Fixer script name inside the bundle.
pub const FIXER_SOURCE: &str = "fix_includes.py";
/// Installed fixer name.
pub const FIXER_BINARY: &str = "fix_include";

/// Result of resolving a release against a toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub variant: LayoutVariant,
    pub mapping: PathMapping,
}

/// Compute the layout variant and path mapping for `release` on `toolchain`.
pub fn resolve(release: &ToolRelease, toolchain: &ToolchainInfo) -> Resolution {
    let variant = release.layout;
    let root = match variant.subdir() {
        Some(subdir) => Location::prefix(subdir),
        None => Location::prefix(""),
    };
    let bin = root.join("bin");
    let lib_clang = root.join("lib").join("clang");
    let include = root.join("include");

    let mut entries = vec![
        MappingEntry::Directory {
            destination: root.clone(),
        },
        MappingEntry::Directory {
            destination: bin.clone(),
        },
        MappingEntry::Directory {
            destination: lib_clang.clone(),
        },
        MappingEntry::Directory {
            destination: include.clone(),
        },
        MappingEntry::FileCopy {
            source: Location::bundle(Path::new("bin").join(ANALYZER_BINARY)),
            destination: bin.join(ANALYZER_BINARY),
        },
        MappingEntry::FileCopy {
            source: Location::bundle(Path::new("bin").join(FIXER_SOURCE)),
            destination: bin.join(FIXER_BINARY),
        },
        MappingEntry::Symlink {
            source: bin.join(ANALYZER_BINARY),
            destination: bin.join(ANALYZER_ALIAS),
        },
        MappingEntry::Symlink {
            source: Location::host(host_library_dir(release, toolchain)),
            destination: lib_clang.join(release.library_dir_name()),
        },
        MappingEntry::Symlink {
            source: Location::host(&toolchain.compiler_include_root),
            destination: include.join("c++"),
        },
    ];

    let entry_points = if variant.exposes_bin() {
        let exposed: Vec<MappingEntry> = entries
            .iter()
            .map(MappingEntry::destination)
            .filter(|dest| dest.root == bin.root && dest.path.parent() == Some(bin.path.as_path()))
            .filter_map(|dest| {
                dest.file_name().map(|name| MappingEntry::Symlink {
                    source: dest.clone(),
                    destination: Location::shared_bin(name),
                })
            })
            .collect();
        entries.extend(exposed);

        EntryPoints {
            analyzer: Location::shared_bin(ANALYZER_ALIAS),
            fixer: Location::shared_bin(FIXER_BINARY),
        }
    } else {
        EntryPoints {
            analyzer: bin.join(ANALYZER_ALIAS),
            fixer: bin.join(FIXER_BINARY),
        }
    };

    tracing::debug!(
        "resolved release {} as {} layout with {} entries",
        release.tool_version,
        variant,
        entries.len()
    );

    Resolution {
        variant,
        mapping: PathMapping {
            entries,
            entry_points,
        },
    }
}

/// The host directory the release's `lib/clang/<ver>.0` link points at.
///
/// When the host toolchain has the release's major.minor, its resource
/// directory is named after the full host version (`3.9.1`); otherwise the
/// link points at the name the release expects.
pub fn host_library_dir(release: &ToolRelease, toolchain: &ToolchainInfo) -> PathBuf {
    let name = if toolchain
        .version
        .matches_major_minor(release.required_library_version)
    {
        toolchain.version.to_string()
    } else {
        release.library_dir_name()
    };
    toolchain.compiler_library_root.join(name)
}
