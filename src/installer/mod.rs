//! Installation builder.
//!
//! Realizes a [`PathMapping`] against concrete directories. Every step is
//! idempotent: directories are created only when missing, copied files are
//! replaced with fresh copies, and symlinks are replaced. Anything that
//! is not ours to replace (a regular file where a link should go, a real
//! directory where a file should go) stops the build.

mod errors;

pub use errors::InstallError;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::{EntryKind, LayoutVariant, Location, MappingEntry, PathMapping, Root};
use crate::resolver::Resolution;
use crate::util::fs::{occupant, relative_path, remove_symlink, symlink, tree_entries, Occupant};
use crate::util::hash::TreeFingerprint;

/// Concrete directories behind the symbolic [`Root`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallRoots {
    /// Extracted prebuilt bundle
    pub bundle: PathBuf,
    /// Installation prefix
    pub prefix: PathBuf,
    /// Shared bin directory for the exposure layer
    pub shared_bin: PathBuf,
}

impl InstallRoots {
    pub fn new(
        bundle: impl Into<PathBuf>,
        prefix: impl Into<PathBuf>,
        shared_bin: impl Into<PathBuf>,
    ) -> Self {
        InstallRoots {
            bundle: bundle.into(),
            prefix: prefix.into(),
            shared_bin: shared_bin.into(),
        }
    }

    /// Turn a symbolic location into a concrete path.
    pub fn locate(&self, location: &Location) -> Result<PathBuf, InstallError> {
        if !location.is_contained() {
            return Err(InstallError::OutsideRoot {
                location: location.to_string(),
            });
        }

        let base = match location.root {
            Root::Bundle => &self.bundle,
            Root::Prefix => &self.prefix,
            Root::SharedBin => &self.shared_bin,
            Root::Host => return Ok(location.path.clone()),
        };

        if location.path.as_os_str().is_empty() {
            Ok(base.clone())
        } else {
            Ok(base.join(&location.path))
        }
    }
}

/// One step of a mapping as it exists on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealizedEntry {
    pub kind: EntryKind,
    pub path: PathBuf,
    /// Copy source or link target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

/// The installed tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallationResult {
    pub prefix: PathBuf,
    pub shared_bin: PathBuf,
    pub variant: LayoutVariant,
    pub entries: Vec<RealizedEntry>,
    /// User-facing analyzer entry point
    pub analyzer: PathBuf,
    /// User-facing fixer entry point
    pub fixer: PathBuf,
}

impl InstallationResult {
    /// Describe a tree that was installed earlier from `resolution`, without
    /// touching the filesystem.
    pub fn existing(
        roots: &InstallRoots,
        resolution: &Resolution,
    ) -> Result<InstallationResult, InstallError> {
        let entries = resolution
            .mapping
            .iter()
            .map(|entry| {
                Ok(RealizedEntry {
                    kind: entry.kind(),
                    path: roots.locate(entry.destination())?,
                    source: entry.source().map(|s| roots.locate(s)).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, InstallError>>()?;

        Ok(InstallationResult {
            prefix: roots.prefix.clone(),
            shared_bin: roots.shared_bin.clone(),
            variant: resolution.variant,
            entries,
            analyzer: roots.locate(&resolution.mapping.entry_points.analyzer)?,
            fixer: roots.locate(&resolution.mapping.entry_points.fixer)?,
        })
    }

    /// Directory holding this installation's bin/lib/include.
    pub fn install_root(&self) -> PathBuf {
        match self.variant.subdir() {
            Some(subdir) => self.prefix.join(subdir),
            None => self.prefix.clone(),
        }
    }

    /// Hash of the tree as it currently exists on disk.
    ///
    /// Covers every realized entry (file contents, link targets) and, for
    /// layouts with a dedicated subdirectory, everything below it. Equal
    /// fingerprints before and after a reinstall mean the rebuild converged
    /// on the same tree.
    pub fn fingerprint(&self) -> Result<String> {
        let mut paths: BTreeSet<PathBuf> = self.entries.iter().map(|e| e.path.clone()).collect();
        if self.variant.subdir().is_some() && self.install_root().is_dir() {
            paths.extend(tree_entries(&self.install_root())?);
        }

        let mut fp = TreeFingerprint::new(self.variant.as_str());
        for path in &paths {
            match occupant(path) {
                Some(Occupant::File) => fp.file(path)?,
                Some(Occupant::Symlink) => {
                    let link_text = fs::read_link(path)
                        .with_context(|| format!("failed to read link {}", path.display()))?;
                    fp.symlink(path, &link_text);
                }
                Some(Occupant::Dir) => fp.directory(path),
                None => fp.missing(path),
            }
        }
        Ok(fp.finish())
    }
}

/// Builds an installation tree from a mapping.
#[derive(Debug, Clone)]
pub struct Installer {
    roots: InstallRoots,
}

impl Installer {
    pub fn new(roots: InstallRoots) -> Self {
        Installer { roots }
    }

    /// Realize every entry of `resolution`'s mapping in order.
    pub fn build(&self, resolution: &Resolution) -> Result<InstallationResult, InstallError> {
        let mapping: &PathMapping = &resolution.mapping;
        let mut entries = Vec::with_capacity(mapping.len());

        for entry in mapping {
            let realized = self.realize(entry)?;
            tracing::debug!("{}", entry);
            entries.push(realized);
        }

        let result = InstallationResult {
            prefix: self.roots.prefix.clone(),
            shared_bin: self.roots.shared_bin.clone(),
            variant: resolution.variant,
            entries,
            analyzer: self.roots.locate(&mapping.entry_points.analyzer)?,
            fixer: self.roots.locate(&mapping.entry_points.fixer)?,
        };

        tracing::info!(
            "Installed {} entries into {}",
            result.entries.len(),
            result.prefix.display()
        );
        Ok(result)
    }

    fn realize(&self, entry: &MappingEntry) -> Result<RealizedEntry, InstallError> {
        let destination = entry.destination();
        if destination.root == Root::SharedBin && entry.kind() != EntryKind::Symlink {
            return Err(InstallError::OutsideRoot {
                location: format!("{} (only symlinks may go into the shared bin directory)", entry),
            });
        }
        if destination.root == Root::Bundle || destination.root == Root::Host {
            return Err(InstallError::OutsideRoot {
                location: entry.to_string(),
            });
        }
        let path = self.roots.locate(destination)?;

        let source = match entry {
            MappingEntry::Directory { .. } => {
                create_dir(&path)?;
                None
            }
            MappingEntry::FileCopy { source, .. } => {
                let source = self.roots.locate(source)?;
                copy_file(&source, &path)?;
                Some(source)
            }
            MappingEntry::Symlink { source, .. } => {
                let target = self.roots.locate(source)?;
                let link_text = if source.root == destination.root {
                    // Links inside one root stay relative so the tree can move.
                    path.parent()
                        .map(|dir| relative_path(dir, &target))
                        .unwrap_or_else(|| target.clone())
                } else {
                    target.clone()
                };
                replace_symlink(&target, &link_text, &path)?;
                Some(target)
            }
        };

        Ok(RealizedEntry {
            kind: entry.kind(),
            path,
            source,
        })
    }
}

fn create_dir(path: &Path) -> Result<(), InstallError> {
    match occupant(path) {
        Some(Occupant::Dir) => Ok(()),
        Some(Occupant::Symlink) if path.is_dir() => Ok(()),
        Some(found) => Err(InstallError::DestinationConflict {
            path: path.to_path_buf(),
            expected: EntryKind::Directory,
            found,
        }),
        None => fs::create_dir_all(path).map_err(|e| InstallError::io(path, e)),
    }
}

fn create_parent(path: &Path) -> Result<(), InstallError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| InstallError::io(parent, e))
        }
        _ => Ok(()),
    }
}

fn copy_file(source: &Path, destination: &Path) -> Result<(), InstallError> {
    if !source.is_file() {
        return Err(InstallError::MissingSource {
            missing: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }

    match occupant(destination) {
        Some(Occupant::Dir) => {
            return Err(InstallError::DestinationConflict {
                path: destination.to_path_buf(),
                expected: EntryKind::FileCopy,
                found: Occupant::Dir,
            });
        }
        Some(Occupant::Symlink) => {
            remove_symlink(destination).map_err(|e| InstallError::io(destination, e))?;
        }
        // A read-only copy from an earlier install cannot be opened for
        // writing, so it is replaced rather than overwritten.
        Some(Occupant::File) => {
            fs::remove_file(destination).map_err(|e| InstallError::io(destination, e))?;
        }
        None => {}
    }

    create_parent(destination)?;
    fs::copy(source, destination).map_err(|e| InstallError::io(destination, e))?;
    Ok(())
}

/// Point `link` at `target`, writing `link_text` as the link contents.
fn replace_symlink(target: &Path, link_text: &Path, link: &Path) -> Result<(), InstallError> {
    if !target.exists() {
        return Err(InstallError::MissingSource {
            missing: target.to_path_buf(),
            destination: link.to_path_buf(),
        });
    }

    match occupant(link) {
        Some(Occupant::Symlink) => {
            remove_symlink(link).map_err(|e| InstallError::io(link, e))?;
        }
        Some(found) => {
            return Err(InstallError::DestinationConflict {
                path: link.to_path_buf(),
                expected: EntryKind::Symlink,
                found,
            });
        }
        None => {}
    }

    create_parent(link)?;
    symlink(link_text, link).map_err(|e| InstallError::io(link, e))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::find_release;
    use crate::resolver::resolve;
    use crate::test_support::{toolchain_tree, BundleFixture};
    use crate::toolchain::ToolchainInfo;
    use crate::util::fs::normalize_path;
    use tempfile::TempDir;

    struct Scene {
        _tmp: TempDir,
        roots: InstallRoots,
        toolchain: ToolchainInfo,
    }

    fn scene(host_version: &str) -> Scene {
        let tmp = TempDir::new().unwrap();
        let base = normalize_path(tmp.path());
        let clang = toolchain_tree(&base.join("llvm"), host_version);
        BundleFixture::healthy().write_to(&base.join("bundle"));

        let toolchain = ToolchainInfo {
            version: host_version.parse().unwrap(),
            compiler: clang,
            toolchain_root: base.join("llvm"),
            compiler_library_root: base.join("llvm/lib/clang"),
            compiler_include_root: base.join("llvm/include/c++/v1"),
        };
        let roots = InstallRoots::new(base.join("bundle"), base.join("opt"), base.join("bin"));

        Scene {
            _tmp: tmp,
            roots,
            toolchain,
        }
    }

    #[test]
    fn test_build_nested_tree() {
        let scene = scene("3.9.1");
        let resolution = resolve(find_release("0.7").unwrap(), &scene.toolchain);

        let result = Installer::new(scene.roots.clone()).build(&resolution).unwrap();

        let root = scene.roots.prefix.join("iwyu");
        assert!(root.join("bin/include-what-you-use").is_file());
        assert!(root.join("bin/fix_include").is_file());
        assert_eq!(
            fs::read_link(root.join("bin/iwyu")).unwrap(),
            PathBuf::from("include-what-you-use")
        );
        assert_eq!(
            fs::read_link(root.join("lib/clang/3.9.0")).unwrap(),
            scene.toolchain.compiler_library_root.join("3.9.1")
        );
        assert!(root.join("include/c++").is_dir());
        assert_eq!(result.analyzer, scene.roots.shared_bin.join("iwyu"));
        assert_eq!(result.fixer, scene.roots.shared_bin.join("fix_include"));
        assert!(result.analyzer.is_file());
        assert_eq!(
            fs::read_link(&result.fixer).unwrap(),
            root.join("bin/fix_include")
        );
    }

    #[test]
    fn test_copied_files_keep_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let scene = scene("3.9.1");
        let resolution = resolve(find_release("0.7").unwrap(), &scene.toolchain);
        let result = Installer::new(scene.roots.clone()).build(&resolution).unwrap();

        let mode = fs::metadata(&result.analyzer).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let scene = scene("3.9.1");
        let resolution = resolve(find_release("0.7").unwrap(), &scene.toolchain);
        let installer = Installer::new(scene.roots.clone());

        let first = installer.build(&resolution).unwrap();
        let before = first.fingerprint().unwrap();
        let second = installer.build(&resolution).unwrap();

        assert_eq!(first, second);
        assert_eq!(before, second.fingerprint().unwrap());
    }

    #[test]
    fn test_reinstall_over_read_only_copies() {
        use std::os::unix::fs::PermissionsExt;

        let scene = scene("3.9.1");
        for name in ["include-what-you-use", "fix_includes.py"] {
            let path = scene.roots.bundle.join("bin").join(name);
            fs::set_permissions(&path, fs::Permissions::from_mode(0o555)).unwrap();
        }
        let resolution = resolve(find_release("0.7").unwrap(), &scene.toolchain);
        let installer = Installer::new(scene.roots.clone());

        let first = installer.build(&resolution).unwrap();
        let second = installer.build(&resolution).unwrap();

        assert_eq!(first, second);
        let copied = scene.roots.prefix.join("iwyu/bin/include-what-you-use");
        let mode = fs::metadata(&copied).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o555);
    }

    #[test]
    fn test_reinstall_after_host_upgrade() {
        let mut scene = scene("3.9.1");
        let installer = Installer::new(scene.roots.clone());
        let old = installer
            .build(&resolve(find_release("0.7").unwrap(), &scene.toolchain))
            .unwrap();
        let old_fingerprint = old.fingerprint().unwrap();

        // The host moves to 3.9.2 in place.
        toolchain_tree(&scene.toolchain.toolchain_root, "3.9.2");
        scene.toolchain.version = "3.9.2".parse().unwrap();
        let new = installer
            .build(&resolve(find_release("0.7").unwrap(), &scene.toolchain))
            .unwrap();

        let library_link = scene.roots.prefix.join("iwyu/lib/clang/3.9.0");
        assert_eq!(
            fs::read_link(&library_link).unwrap(),
            scene.toolchain.compiler_library_root.join("3.9.2")
        );
        assert_ne!(old_fingerprint, new.fingerprint().unwrap());
    }

    #[test]
    fn test_flat_tree_has_no_shared_bin_links() {
        let scene = scene("3.5.2");
        let resolution = resolve(find_release("0.3").unwrap(), &scene.toolchain);

        let result = Installer::new(scene.roots.clone()).build(&resolution).unwrap();

        assert!(scene.roots.prefix.join("bin/iwyu").exists());
        assert!(scene.roots.prefix.join("lib/clang/3.5.0").is_dir());
        assert!(!scene.roots.shared_bin.exists());
        assert_eq!(result.analyzer, scene.roots.prefix.join("bin/iwyu"));
    }

    #[test]
    fn test_missing_host_library_dir() {
        // 0.6 on a 3.9 host links lib/clang/3.8.0, which the host lacks.
        let scene = scene("3.9.1");
        let resolution = resolve(find_release("0.6").unwrap(), &scene.toolchain);

        let err = Installer::new(scene.roots.clone())
            .build(&resolution)
            .unwrap_err();

        match err {
            InstallError::MissingSource { missing, .. } => {
                assert_eq!(missing, scene.toolchain.compiler_library_root.join("3.8.0"))
            }
            other => panic!("expected MissingSource, got {other:?}"),
        }
        // Earlier steps stay on disk.
        assert!(scene.roots.prefix.join("iwyu/bin/iwyu").exists());
    }

    #[test]
    fn test_missing_bundle_binary() {
        let scene = scene("3.9.1");
        fs::remove_file(scene.roots.bundle.join("bin/fix_includes.py")).unwrap();
        let resolution = resolve(find_release("0.7").unwrap(), &scene.toolchain);

        let err = Installer::new(scene.roots.clone())
            .build(&resolution)
            .unwrap_err();

        assert!(matches!(err, InstallError::MissingSource { .. }));
    }

    #[test]
    fn test_regular_file_blocks_symlink() {
        let scene = scene("3.9.1");
        fs::create_dir_all(&scene.roots.shared_bin).unwrap();
        fs::write(scene.roots.shared_bin.join("iwyu"), "someone else's").unwrap();
        let resolution = resolve(find_release("0.7").unwrap(), &scene.toolchain);

        let err = Installer::new(scene.roots.clone())
            .build(&resolution)
            .unwrap_err();

        match err {
            InstallError::DestinationConflict {
                path,
                expected,
                found,
            } => {
                assert_eq!(path, scene.roots.shared_bin.join("iwyu"));
                assert_eq!(expected, EntryKind::Symlink);
                assert_eq!(found, Occupant::File);
            }
            other => panic!("expected DestinationConflict, got {other:?}"),
        }
        assert_eq!(
            fs::read_to_string(scene.roots.shared_bin.join("iwyu")).unwrap(),
            "someone else's"
        );
    }

    #[test]
    fn test_stale_symlink_is_replaced() {
        let scene = scene("3.9.1");
        fs::create_dir_all(&scene.roots.shared_bin).unwrap();
        symlink(Path::new("/nonexistent/iwyu"), &scene.roots.shared_bin.join("iwyu")).unwrap();
        let resolution = resolve(find_release("0.7").unwrap(), &scene.toolchain);

        Installer::new(scene.roots.clone()).build(&resolution).unwrap();

        assert_eq!(
            fs::read_link(scene.roots.shared_bin.join("iwyu")).unwrap(),
            scene.roots.prefix.join("iwyu/bin/iwyu")
        );
    }

    #[test]
    fn test_file_where_directory_goes() {
        let scene = scene("3.9.1");
        fs::create_dir_all(&scene.roots.prefix).unwrap();
        fs::write(scene.roots.prefix.join("iwyu"), "").unwrap();
        let resolution = resolve(find_release("0.7").unwrap(), &scene.toolchain);

        let err = Installer::new(scene.roots.clone())
            .build(&resolution)
            .unwrap_err();

        assert!(matches!(
            err,
            InstallError::DestinationConflict {
                expected: EntryKind::Directory,
                found: Occupant::File,
                ..
            }
        ));
    }

    #[test]
    fn test_outside_root_is_rejected() {
        let scene = scene("3.9.1");
        let mut resolution = resolve(find_release("0.7").unwrap(), &scene.toolchain);
        resolution.mapping.entries.push(MappingEntry::FileCopy {
            source: Location::bundle("bin/include-what-you-use"),
            destination: Location::shared_bin("include-what-you-use"),
        });

        let err = Installer::new(scene.roots.clone())
            .build(&resolution)
            .unwrap_err();
        assert!(matches!(err, InstallError::OutsideRoot { .. }));

        let escaped = Location::prefix("../../etc/iwyu");
        assert!(matches!(
            scene.roots.locate(&escaped),
            Err(InstallError::OutsideRoot { .. })
        ));
    }

    #[test]
    fn test_existing_matches_built_result() {
        let scene = scene("3.9.1");
        let resolution = resolve(find_release("0.7").unwrap(), &scene.toolchain);
        let built = Installer::new(scene.roots.clone()).build(&resolution).unwrap();

        let existing = InstallationResult::existing(&scene.roots, &resolution).unwrap();

        assert_eq!(built, existing);
    }
}
