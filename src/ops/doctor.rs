//! Environment and toolchain health checks.
//!
//! The `doctor` command checks that the host toolchain can support an
//! install before anything is written.
//!
//! ## Usage
//!
//! ```bash
//! berth doctor           # Quick check
//! berth doctor --verbose # Detailed output
//! ```
//!
//! ## Checks Performed
//!
//! - clang driver availability and version
//! - Compatibility of the host version with the selected release
//! - Compiler resource directory (`lib/clang/<version>`)
//! - C++ standard library headers
//! - Configuration files parse

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::core::{ToolRelease, DEFAULT_RELEASE};
use crate::resolver::{host_library_dir, lookup_release};
use crate::toolchain::{ToolchainInfo, ToolchainLocator};
use crate::util::config::{global_config_path, project_config_path, Config};
use crate::util::process::Executor;

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    /// Worth knowing, but an install can still succeed.
    Warn,
    /// An install will fail.
    Fail,
}

impl CheckStatus {
    fn marker(self) -> &'static str {
        match self {
            CheckStatus::Ok => "[OK]",
            CheckStatus::Warn => "[??]",
            CheckStatus::Fail => "[!!]",
        }
    }
}

/// Result of a single health check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl CheckResult {
    fn new(name: impl Into<String>, status: CheckStatus, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            status,
            message: message.into(),
            path: None,
        }
    }

    pub fn ok(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult::new(name, CheckStatus::Ok, message)
    }

    pub fn warn(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult::new(name, CheckStatus::Warn, message)
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult::new(name, CheckStatus::Fail, message)
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// All checks for one host and release.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub os: &'static str,
    pub arch: &'static str,
    pub release: &'static str,
    pub checks: Vec<CheckResult>,
}

impl DoctorReport {
    fn new(release: &ToolRelease) -> Self {
        DoctorReport {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            release: release.tool_version,
            checks: Vec::new(),
        }
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    /// No check predicts a failed install.
    pub fn ready(&self) -> bool {
        self.count(CheckStatus::Fail) == 0
    }

    pub fn get(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Options for the doctor command.
#[derive(Debug, Clone)]
pub struct DoctorOptions {
    /// Release to check compatibility for
    pub release: String,
    /// Explicit clang driver
    pub clang: Option<PathBuf>,
    /// Project directory whose `.berth/config.toml` is checked
    pub cwd: PathBuf,
}

impl Default for DoctorOptions {
    fn default() -> Self {
        DoctorOptions {
            release: DEFAULT_RELEASE.to_string(),
            clang: None,
            cwd: PathBuf::from("."),
        }
    }
}

/// Run every check against the host.
pub fn doctor(options: &DoctorOptions, executor: &mut dyn Executor) -> Result<DoctorReport> {
    let release = lookup_release(&options.release)?;
    let mut report = DoctorReport::new(release);

    let locator = ToolchainLocator::new().with_override(options.clang.clone());
    match locator.probe(executor) {
        Ok(info) => {
            report.checks.push(
                CheckResult::ok("clang", format!("found clang {}", info.version))
                    .with_path(&info.compiler),
            );
            report.checks.push(check_compatibility(&info, release));
            report.checks.push(check_library_dir(&info, release));
            report.checks.push(check_include_dir(&info));
        }
        Err(e) => report.checks.push(CheckResult::fail("clang", e.to_string())),
    }

    if let Some(path) = global_config_path() {
        report.checks.push(check_config("Global config", &path));
    }
    report.checks.push(check_config(
        "Project config",
        &project_config_path(&options.cwd),
    ));

    Ok(report)
}

/// Host version against the release's requirements.
fn check_compatibility(info: &ToolchainInfo, release: &ToolRelease) -> CheckResult {
    let name = format!("Release {}", release.tool_version);

    if info.version < release.minimum_toolchain {
        CheckResult::fail(
            name,
            format!(
                "clang {} is too old; {} or newer is required",
                info.version, release.minimum_toolchain
            ),
        )
    } else if info
        .version
        .matches_major_minor(release.required_library_version)
    {
        CheckResult::ok(
            name,
            format!("built against clang {}", release.required_library_version),
        )
    } else {
        CheckResult::warn(
            name,
            format!(
                "built against clang {}, host has {}; the resource directory may not match",
                release.required_library_version,
                info.version.major_minor()
            ),
        )
    }
}

/// The resource directory the install will link must exist.
fn check_library_dir(info: &ToolchainInfo, release: &ToolRelease) -> CheckResult {
    let name = "Compiler resource directory";
    let dir = host_library_dir(release, info);

    let result = if dir.is_dir() {
        CheckResult::ok(name, "present")
    } else {
        CheckResult::fail(
            name,
            format!("missing; `lib/clang/{}` would dangle", release.library_dir_name()),
        )
    };
    result.with_path(dir)
}

fn check_include_dir(info: &ToolchainInfo) -> CheckResult {
    let result = if info.compiler_include_root.is_dir() {
        CheckResult::ok("C++ headers", "present")
    } else {
        CheckResult::fail("C++ headers", "missing; `include/c++` would dangle")
    };
    result.with_path(&info.compiler_include_root)
}

/// A config file that exists must parse. Berth falls back to defaults when
/// it doesn't, so this only warns.
fn check_config(name: &str, path: &Path) -> CheckResult {
    let result = if !path.exists() {
        CheckResult::ok(name, "not present")
    } else {
        match Config::load(path) {
            Ok(_) => CheckResult::ok(name, "ok"),
            Err(e) => CheckResult::warn(name, format!("{:#}; defaults will be used", e)),
        }
    };
    result.with_path(path)
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    writeln!(output, "Berth Doctor").unwrap();
    writeln!(output, "============\n").unwrap();

    if verbose {
        writeln!(output, "Host: {} ({})", report.os, report.arch).unwrap();
        writeln!(output, "Release: {}\n", report.release).unwrap();
    }

    writeln!(output, "Checks:").unwrap();
    for check in &report.checks {
        writeln!(output, "  {} {}", check.status.marker(), check.name).unwrap();

        if verbose || check.status != CheckStatus::Ok {
            writeln!(output, "      {}", check.message).unwrap();
        }
        if let (true, Some(path)) = (verbose, &check.path) {
            writeln!(output, "      Path: {}", path.display()).unwrap();
        }
    }

    let failed = report.count(CheckStatus::Fail);
    let warned = report.count(CheckStatus::Warn);
    writeln!(
        output,
        "\nSummary: {} ok, {} warnings, {} failed",
        report.count(CheckStatus::Ok),
        warned,
        failed
    )
    .unwrap();

    if failed > 0 {
        writeln!(output, "\n`berth install` will not succeed on this host.").unwrap();
    } else if warned > 0 {
        writeln!(output, "\nReady to install; review the warnings above.").unwrap();
    } else {
        writeln!(output, "\nAll checks passed. Ready to install.").unwrap();
    }

    output
}
