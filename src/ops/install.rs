//! `berth install` and `berth verify`.
//!
//! Both run the same pipeline up to resolution: look up the release,
//! discover the host toolchain, resolve the mapping. Install then builds
//! the tree and verifies it; verify only describes the existing tree and
//! re-runs the harness.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::core::{ToolRelease, DEFAULT_RELEASE};
use crate::installer::{InstallRoots, InstallationResult, Installer};
use crate::resolver::{lookup_release, resolve};
use crate::toolchain::ToolchainInfo;
use crate::util::fs::absolute_path;
use crate::util::process::Executor;
use crate::verify::{Fixture, Harness, VerificationOutcome};

use super::plan::discover_toolchain;

/// Options for installing a release.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Extracted prebuilt bundle
    pub bundle: PathBuf,
    /// Installation prefix
    pub prefix: PathBuf,
    /// Shared bin directory for nested layouts
    pub bin_dir: PathBuf,
    /// Release to install
    pub release: String,
    /// Explicit clang driver
    pub clang: Option<PathBuf>,
    /// Skip the verification run
    pub skip_verify: bool,
    /// Fixture used for verification
    pub fixture: Fixture,
}

impl InstallOptions {
    pub fn new(
        bundle: impl Into<PathBuf>,
        prefix: impl Into<PathBuf>,
        bin_dir: impl Into<PathBuf>,
    ) -> Self {
        InstallOptions {
            bundle: bundle.into(),
            prefix: prefix.into(),
            bin_dir: bin_dir.into(),
            release: DEFAULT_RELEASE.to_string(),
            clang: None,
            skip_verify: false,
            fixture: Fixture::transitive_includes(),
        }
    }
}

/// Result of an install.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub release: &'static ToolRelease,
    pub toolchain: ToolchainInfo,
    pub installation: InstallationResult,
    /// Hash of the realized tree
    pub fingerprint: String,
    /// `None` when verification was skipped
    pub verification: Option<VerificationOutcome>,
}

impl InstallReport {
    pub fn short_fingerprint(&self) -> &str {
        let end = self.fingerprint.len().min(16);
        &self.fingerprint[..end]
    }
}

/// Install a release and verify it.
pub fn install(opts: &InstallOptions, executor: &mut dyn Executor) -> Result<InstallReport> {
    let release = lookup_release(&opts.release)?;

    if !opts.bundle.is_dir() {
        bail!("bundle directory does not exist: {}", opts.bundle.display());
    }

    let toolchain = discover_toolchain(opts.clang.clone(), release, executor)?;
    let resolution = resolve(release, &toolchain);

    let installer = Installer::new(InstallRoots::new(
        absolute_path(&opts.bundle)?,
        absolute_path(&opts.prefix)?,
        absolute_path(&opts.bin_dir)?,
    ));
    let installation = installer.build(&resolution)?;
    let fingerprint = installation
        .fingerprint()
        .with_context(|| format!("failed to fingerprint {}", installation.prefix.display()))?;

    let verification = if opts.skip_verify {
        tracing::info!("Skipping verification");
        None
    } else {
        Some(Harness::new(executor).verify(
            &installation,
            &opts.fixture,
            release.exit_convention,
        )?)
    };

    Ok(InstallReport {
        release,
        toolchain,
        installation,
        fingerprint,
        verification,
    })
}

/// Options for verifying an existing installation.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Installation prefix
    pub prefix: PathBuf,
    /// Shared bin directory for nested layouts
    pub bin_dir: PathBuf,
    /// Release that was installed
    pub release: String,
    /// Explicit clang driver
    pub clang: Option<PathBuf>,
    /// Fixture to analyze
    pub fixture: Fixture,
}

impl VerifyOptions {
    pub fn new(prefix: impl Into<PathBuf>, bin_dir: impl Into<PathBuf>) -> Self {
        VerifyOptions {
            prefix: prefix.into(),
            bin_dir: bin_dir.into(),
            release: DEFAULT_RELEASE.to_string(),
            clang: None,
            fixture: Fixture::transitive_includes(),
        }
    }
}

/// Re-run the verification harness on an installed tree.
pub fn verify_installed(
    opts: &VerifyOptions,
    executor: &mut dyn Executor,
) -> Result<VerificationOutcome> {
    let release = lookup_release(&opts.release)?;
    let toolchain = discover_toolchain(opts.clang.clone(), release, executor)?;
    let resolution = resolve(release, &toolchain);

    // The bundle is not needed to describe an installed tree.
    let roots = InstallRoots::new(
        PathBuf::new(),
        absolute_path(&opts.prefix)?,
        absolute_path(&opts.bin_dir)?,
    );
    let installation = InstallationResult::existing(&roots, &resolution)?;

    if !installation.analyzer.exists() {
        bail!(
            "no include-what-you-use {} installation found (missing {})",
            release.tool_version,
            installation.analyzer.display()
        );
    }

    Ok(Harness::new(executor).verify(&installation, &opts.fixture, release.exit_convention)?)
}
