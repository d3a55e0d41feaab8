//! Installation layouts and path mappings.
//!
//! A [`PathMapping`] is an ordered list of filesystem steps expressed
//! against symbolic roots ([`Root`]) rather than concrete directories, so it
//! can be computed without touching the filesystem and realized later by the
//! installer.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// Name of the dedicated subdirectory used by nested layouts.
pub const NESTED_SUBDIR: &str = "iwyu";

/// Install topology of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVariant {
    /// `prefix/{bin,lib,include}`.
    Flat,
    /// `prefix/iwyu/{bin,lib,include}` plus a bin exposure layer in the
    /// shared bin directory, keeping `lib/clang` and `include/c++` out of
    /// directories shared with other compilers.
    Nested,
}

impl LayoutVariant {
    /// Subdirectory of the prefix holding bin/lib/include, if any.
    pub fn subdir(self) -> Option<&'static str> {
        match self {
            LayoutVariant::Flat => None,
            LayoutVariant::Nested => Some(NESTED_SUBDIR),
        }
    }

    /// Whether binaries are exposed through symlinks in the shared bin dir.
    pub fn exposes_bin(self) -> bool {
        matches!(self, LayoutVariant::Nested)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutVariant::Flat => "flat",
            LayoutVariant::Nested => "nested",
        }
    }
}

impl fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symbolic base directory of a [`Location`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Root {
    /// The extracted prebuilt bundle.
    Bundle,
    /// The installation prefix.
    Prefix,
    /// The shared, system-wide bin directory.
    SharedBin,
    /// An absolute path on the host (toolchain directories).
    Host,
}

impl Root {
    pub fn as_str(self) -> &'static str {
        match self {
            Root::Bundle => "bundle",
            Root::Prefix => "prefix",
            Root::SharedBin => "shared-bin",
            Root::Host => "host",
        }
    }
}

/// A path relative to a symbolic root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub root: Root,
    pub path: PathBuf,
}

impl Location {
    pub fn new(root: Root, path: impl Into<PathBuf>) -> Self {
        Location {
            root,
            path: path.into(),
        }
    }

    pub fn bundle(path: impl Into<PathBuf>) -> Self {
        Location::new(Root::Bundle, path)
    }

    pub fn prefix(path: impl Into<PathBuf>) -> Self {
        Location::new(Root::Prefix, path)
    }

    pub fn shared_bin(path: impl Into<PathBuf>) -> Self {
        Location::new(Root::SharedBin, path)
    }

    pub fn host(path: impl Into<PathBuf>) -> Self {
        Location::new(Root::Host, path)
    }

    /// A location below this one.
    pub fn join(&self, path: impl AsRef<Path>) -> Self {
        Location::new(self.root, self.path.join(path))
    }

    /// Final path component, if any.
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }

    /// True when the path stays inside its root: relative and free of `..`.
    ///
    /// Host locations are absolute by construction and always contained.
    pub fn is_contained(&self) -> bool {
        if self.root == Root::Host {
            return true;
        }
        self.path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Root::Host => write!(f, "{}", self.path.display()),
            root => write!(f, "<{}>/{}", root.as_str(), self.path.display()),
        }
    }
}

/// Kind of a mapping entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Directory,
    FileCopy,
    Symlink,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Directory => "directory",
            EntryKind::FileCopy => "file-copy",
            EntryKind::Symlink => "symlink",
        }
    }
}

/// One step of a [`PathMapping`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MappingEntry {
    /// Create a directory (and its parents).
    Directory { destination: Location },
    /// Copy a file.
    FileCopy {
        source: Location,
        destination: Location,
    },
    /// Create `destination` as a symlink pointing at `source`.
    Symlink {
        source: Location,
        destination: Location,
    },
}

impl MappingEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            MappingEntry::Directory { .. } => EntryKind::Directory,
            MappingEntry::FileCopy { .. } => EntryKind::FileCopy,
            MappingEntry::Symlink { .. } => EntryKind::Symlink,
        }
    }

    pub fn source(&self) -> Option<&Location> {
        match self {
            MappingEntry::Directory { .. } => None,
            MappingEntry::FileCopy { source, .. } | MappingEntry::Symlink { source, .. } => {
                Some(source)
            }
        }
    }

    pub fn destination(&self) -> &Location {
        match self {
            MappingEntry::Directory { destination }
            | MappingEntry::FileCopy { destination, .. }
            | MappingEntry::Symlink { destination, .. } => destination,
        }
    }
}

impl fmt::Display for MappingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingEntry::Directory { destination } => write!(f, "mkdir   {destination}"),
            MappingEntry::FileCopy {
                source,
                destination,
            } => write!(f, "copy    {source} -> {destination}"),
            MappingEntry::Symlink {
                source,
                destination,
            } => write!(f, "symlink {destination} -> {source}"),
        }
    }
}

/// Where the user-facing binaries end up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryPoints {
    pub analyzer: Location,
    pub fixer: Location,
}

/// Ordered installation steps plus the resulting entry points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathMapping {
    pub entries: Vec<MappingEntry>,
    pub entry_points: EntryPoints,
}

impl PathMapping {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MappingEntry> {
        self.entries.iter()
    }

    /// Destinations written outside the prefix.
    pub fn cross_boundary(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries
            .iter()
            .filter(|e| e.destination().root != Root::Prefix)
    }
}

impl<'a> IntoIterator for &'a PathMapping {
    type Item = &'a MappingEntry;
    type IntoIter = std::slice::Iter<'a, MappingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
