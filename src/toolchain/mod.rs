//! Host clang toolchain discovery.
//!
//! Discovery order for the clang driver:
//! 1. An explicit override (`--clang` or `toolchain.clang` in config)
//! 2. The `BERTH_CLANG` environment variable
//! 3. `clang` on `PATH`
//!
//! The result is an immutable [`ToolchainInfo`] that every later stage takes
//! as an explicit input. It is never cached across runs: a host toolchain
//! upgrade requires a fresh discovery and a reinstall.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::core::ToolchainVersion;
use crate::util::diagnostic::{suggestions, Diagnostic};

mod detect;

pub use detect::{ToolchainLocator, CLANG_ENV_VAR};

/// Facts about the host toolchain gathered by [`ToolchainLocator::discover`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainInfo {
    /// Version parsed from the compiler banner
    pub version: ToolchainVersion,
    /// The clang driver that was probed
    pub compiler: PathBuf,
    /// Installation root of the toolchain (parent of its `bin` directory)
    pub toolchain_root: PathBuf,
    /// Directory holding per-version resource directories (`lib/clang`)
    pub compiler_library_root: PathBuf,
    /// C++ standard library headers
    pub compiler_include_root: PathBuf,
}

impl ToolchainInfo {
    /// `"3.9"` for a 3.9.1 toolchain.
    pub fn major_minor_version(&self) -> String {
        self.version.major_minor()
    }
}

/// Errors raised while discovering the host toolchain.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("no clang toolchain found")]
    NotFound { searched: Vec<String> },

    #[error("clang {found} is too old; {required} or newer is required")]
    TooOld {
        found: ToolchainVersion,
        required: ToolchainVersion,
        compiler: PathBuf,
    },

    #[error("could not find a version number in the output of `{compiler} --version`")]
    UnparsableVersion { compiler: String, banner: String },

    #[error("failed to run `{compiler} --version`")]
    Probe {
        compiler: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ToolchainError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ToolchainError::NotFound { searched } => {
                let mut diag = Diagnostic::error("no clang toolchain found");
                for place in searched {
                    diag = diag.with_context(format!("looked in {}", place));
                }
                diag.with_suggestion(suggestions::NO_TOOLCHAIN)
            }

            ToolchainError::TooOld {
                found,
                required,
                compiler,
            } => Diagnostic::error(format!("clang {} is too old", found))
                .with_location(compiler)
                .with_context(format!("this release requires clang {} or newer", required))
                .with_suggestion("Upgrade the host clang toolchain")
                .with_suggestion("Install an older release with `--release`"),

            ToolchainError::UnparsableVersion { compiler, banner } => Diagnostic::error(
                "could not determine the clang version",
            )
            .with_location(compiler)
            .with_context(if banner.trim().is_empty() {
                "`--version` printed nothing".to_string()
            } else {
                banner.clone()
            })
            .with_suggestion("Check that the configured compiler is a clang driver"),

            ToolchainError::Probe { compiler, source } => {
                Diagnostic::error(format!("failed to run `{} --version`", compiler))
                    .with_context(source.to_string())
                    .with_suggestion(suggestions::NO_TOOLCHAIN)
            }
        }
    }
}
