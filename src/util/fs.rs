//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// What currently occupies a path, without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    File,
    Dir,
    Symlink,
}

impl Occupant {
    pub fn as_str(self) -> &'static str {
        match self {
            Occupant::File => "file",
            Occupant::Dir => "directory",
            Occupant::Symlink => "symlink",
        }
    }
}

/// Inspect a path without following a final symlink.
///
/// A dangling symlink is still reported as `Symlink`.
pub fn occupant(path: &Path) -> Option<Occupant> {
    let meta = fs::symlink_metadata(path).ok()?;
    let ty = meta.file_type();
    if ty.is_symlink() {
        Some(Occupant::Symlink)
    } else if ty.is_dir() {
        Some(Occupant::Dir)
    } else {
        Some(Occupant::File)
    }
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the path as-is if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Make `path` absolute against the current directory without touching the
/// filesystem.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("failed to resolve path: {}", path.display()))
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// All paths below `root` (excluding `root`), sorted, symlinks not followed.
pub fn tree_entries(root: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry =
            entry.with_context(|| format!("failed to walk directory: {}", root.display()))?;
        entries.push(entry.into_path());
    }
    entries.sort();
    Ok(entries)
}

/// Create a symlink (platform-aware).
#[cfg(unix)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}

/// Remove a symlink itself, never its target.
#[cfg(unix)]
pub fn remove_symlink(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

#[cfg(windows)]
pub fn remove_symlink(path: &Path) -> io::Result<()> {
    // Directory symlinks on Windows must be removed as directories.
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}
