//! Toolchain detection.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::core::ToolchainVersion;
use crate::util::fs::normalize_path;
use crate::util::process::{find_executable, Executor, ProcessBuilder};

use super::{ToolchainError, ToolchainInfo};

/// Environment variable naming the clang driver to probe.
pub const CLANG_ENV_VAR: &str = "BERTH_CLANG";

/// C++ header directories tried below the toolchain root, in order.
const INCLUDE_CANDIDATES: &[&str] = &["include/c++/v1", "include/c++"];

/// Locates the host clang toolchain.
///
/// Probing is read-only: the locator runs `clang --version` and inspects
/// directories but never writes anything.
#[derive(Debug, Clone)]
pub struct ToolchainLocator {
    override_path: Option<PathBuf>,
    env_path: Option<PathBuf>,
    search_path: bool,
}

impl Default for ToolchainLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolchainLocator {
    /// A locator honoring `BERTH_CLANG` and `PATH`.
    pub fn new() -> Self {
        ToolchainLocator {
            override_path: None,
            env_path: std::env::var_os(CLANG_ENV_VAR).map(PathBuf::from),
            search_path: true,
        }
    }

    /// A locator that only considers `compiler`.
    pub fn for_compiler(compiler: impl Into<PathBuf>) -> Self {
        ToolchainLocator {
            override_path: Some(compiler.into()),
            env_path: None,
            search_path: false,
        }
    }

    /// Prefer an explicitly configured compiler, when given.
    pub fn with_override(mut self, compiler: Option<PathBuf>) -> Self {
        if compiler.is_some() {
            self.override_path = compiler;
        }
        self
    }

    /// Discover the toolchain and require it to be at least `minimum`.
    pub fn discover(
        &self,
        executor: &mut dyn Executor,
        minimum: &ToolchainVersion,
    ) -> Result<ToolchainInfo, ToolchainError> {
        let info = self.probe(executor)?;

        if info.version < *minimum {
            return Err(ToolchainError::TooOld {
                found: info.version,
                required: minimum.clone(),
                compiler: info.compiler,
            });
        }

        tracing::info!(
            "Using clang {} at {}",
            info.version,
            info.toolchain_root.display()
        );
        Ok(info)
    }

    /// Discover the toolchain without any minimum-version gate.
    pub fn probe(&self, executor: &mut dyn Executor) -> Result<ToolchainInfo, ToolchainError> {
        let compiler = self.find_compiler()?;
        let version = probe_version(executor, &compiler)?;

        // The driver knows its resource directory even behind a shim. Without
        // an answer, distribution packages usually expose clang as a symlink
        // into the versioned toolchain directory, so the real location counts.
        let resolved = normalize_path(&compiler);
        let toolchain_root = resource_dir(executor, &compiler)
            .and_then(|dir| root_of_resource_dir(&dir))
            .unwrap_or_else(|| toolchain_root(&resolved));
        tracing::debug!(
            "clang {} resolved to {} (root {})",
            version,
            resolved.display(),
            toolchain_root.display()
        );

        Ok(ToolchainInfo {
            version,
            compiler,
            compiler_library_root: toolchain_root.join("lib").join("clang"),
            compiler_include_root: include_root(&toolchain_root),
            toolchain_root,
        })
    }

    fn find_compiler(&self) -> Result<PathBuf, ToolchainError> {
        let mut searched = Vec::new();

        if let Some(ref path) = self.override_path {
            if let Some(found) = resolve_program(path) {
                return Ok(found);
            }
            tracing::warn!("Configured clang not found: {}", path.display());
            searched.push(format!("configured compiler {}", path.display()));
        }

        if let Some(ref path) = self.env_path {
            if let Some(found) = resolve_program(path) {
                return Ok(found);
            }
            searched.push(format!("{}={}", CLANG_ENV_VAR, path.display()));
        }

        if self.search_path {
            if let Some(found) = find_executable("clang") {
                return Ok(found);
            }
            searched.push("`clang` on PATH".to_string());
        }

        Err(ToolchainError::NotFound { searched })
    }
}

/// Resolve a configured compiler: bare names go through `PATH`, anything
/// with a directory component must exist as given.
fn resolve_program(path: &Path) -> Option<PathBuf> {
    if path.components().count() > 1 {
        path.is_file().then(|| path.to_path_buf())
    } else {
        find_executable(&path.to_string_lossy())
    }
}

fn probe_version(
    executor: &mut dyn Executor,
    compiler: &Path,
) -> Result<ToolchainVersion, ToolchainError> {
    let display = compiler.display().to_string();
    let output = executor
        .execute(&ProcessBuilder::new(compiler).arg("--version"))
        .map_err(|e| ToolchainError::Probe {
            compiler: display.clone(),
            source: e.into(),
        })?;

    // Some drivers print their banner on stderr.
    let banner = output.combined();
    ToolchainVersion::from_banner(&banner).ok_or(ToolchainError::UnparsableVersion {
        compiler: display,
        banner,
    })
}

/// `<clang> -print-resource-dir`, when the driver supports it and names a
/// directory that exists.
fn resource_dir(executor: &mut dyn Executor, compiler: &Path) -> Option<PathBuf> {
    let output = match executor.execute(&ProcessBuilder::new(compiler).arg("-print-resource-dir")) {
        Ok(output) if output.code == Some(0) => output,
        Ok(output) => {
            tracing::debug!("-print-resource-dir exited with {:?}", output.code);
            return None;
        }
        Err(e) => {
            tracing::debug!("-print-resource-dir failed: {:#}", e);
            return None;
        }
    };

    let dir = PathBuf::from(output.stdout.trim());
    (dir.is_absolute() && dir.is_dir()).then(|| normalize_path(&dir))
}

/// `<root>/lib/clang/<version>` back to `<root>`.
fn root_of_resource_dir(dir: &Path) -> Option<PathBuf> {
    let library_root = dir.parent()?;
    if library_root.file_name()? != OsStr::new("clang") {
        return None;
    }
    library_root.parent()?.parent().map(Path::to_path_buf)
}

fn toolchain_root(compiler: &Path) -> PathBuf {
    compiler
        .parent()
        .and_then(Path::parent)
        .or_else(|| compiler.parent())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"))
}

fn include_root(toolchain_root: &Path) -> PathBuf {
    let candidates: Vec<PathBuf> = INCLUDE_CANDIDATES
        .iter()
        .map(|c| toolchain_root.join(c))
        .collect();

    candidates
        .iter()
        .find(|c| c.is_dir())
        .unwrap_or(&candidates[0])
        .clone()
}
