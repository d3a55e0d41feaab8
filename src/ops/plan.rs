//! `berth plan`: resolve a release without touching the filesystem.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::core::{ToolRelease, DEFAULT_RELEASE};
use crate::resolver::{lookup_release, resolve, Resolution};
use crate::toolchain::{ToolchainInfo, ToolchainLocator};
use crate::util::process::Executor;

/// Options for planning an install.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Release to plan for
    pub release: String,
    /// Explicit clang driver
    pub clang: Option<PathBuf>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        PlanOptions {
            release: DEFAULT_RELEASE.to_string(),
            clang: None,
        }
    }
}

/// A resolved install plan.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub release: &'static ToolRelease,
    pub toolchain: ToolchainInfo,
    pub resolution: Resolution,
}

/// Look up the release, discover the toolchain and resolve the mapping.
pub fn plan(opts: &PlanOptions, executor: &mut dyn Executor) -> Result<PlanReport> {
    let release = lookup_release(&opts.release)?;
    let toolchain = discover_toolchain(opts.clang.clone(), release, executor)?;
    let resolution = resolve(release, &toolchain);

    Ok(PlanReport {
        release,
        toolchain,
        resolution,
    })
}

/// Discover the host toolchain and check it against `release`.
pub(crate) fn discover_toolchain(
    clang: Option<PathBuf>,
    release: &ToolRelease,
    executor: &mut dyn Executor,
) -> Result<ToolchainInfo> {
    let info = ToolchainLocator::new()
        .with_override(clang)
        .discover(executor, &release.minimum_toolchain)?;

    if !info
        .version
        .matches_major_minor(release.required_library_version)
    {
        tracing::warn!(
            "include-what-you-use {} was built against clang {}, host has {}",
            release.tool_version,
            release.required_library_version,
            info.version
        );
    }
    Ok(info)
}
