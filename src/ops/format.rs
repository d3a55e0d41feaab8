//! Output formatting for command results (human/JSON).

use std::fmt::Write as _;

use serde::Serialize;

use crate::core::{ToolRelease, DEFAULT_RELEASE};
use crate::toolchain::ToolchainInfo;
use crate::verify::VerificationOutcome;

use super::install::InstallReport;
use super::plan::PlanReport;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// Machine-readable JSON output
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            _ => Err(OutputFormatParseError(s.to_string())),
        }
    }
}

/// Error parsing output format option.
#[derive(Debug, Clone)]
pub struct OutputFormatParseError(pub String);

impl std::fmt::Display for OutputFormatParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid output format '{}', valid values: human, json",
            self.0
        )
    }
}

impl std::error::Error for OutputFormatParseError {}

/// Serialize any report as pretty JSON.
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize result: {}"}}"#, e))
}

/// Format the compatibility table.
pub fn format_releases(releases: &[ToolRelease]) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "{:<8} {:<8} {:<8} {}",
        "release", "clang", "layout", "exit codes"
    )
    .unwrap();
    for release in releases {
        let marker = if release.tool_version == DEFAULT_RELEASE {
            " (default)"
        } else {
            ""
        };
        writeln!(
            output,
            "{:<8} {:<8} {:<8} {}{}",
            release.tool_version,
            release.required_library_version,
            release.layout.as_str(),
            release.exit_convention.as_str(),
            marker
        )
        .unwrap();
    }

    output
}

/// Format discovered toolchain facts.
pub fn format_toolchain(info: &ToolchainInfo) -> String {
    let mut output = String::new();

    writeln!(output, "clang {}", info.version).unwrap();
    writeln!(output, "  compiler:      {}", info.compiler.display()).unwrap();
    writeln!(output, "  root:          {}", info.toolchain_root.display()).unwrap();
    writeln!(
        output,
        "  library root:  {}",
        info.compiler_library_root.display()
    )
    .unwrap();
    writeln!(
        output,
        "  include root:  {}",
        info.compiler_include_root.display()
    )
    .unwrap();

    output
}

/// Format a resolved plan.
pub fn format_plan(report: &PlanReport) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "Plan: include-what-you-use {} on clang {} ({} layout)",
        report.release.tool_version, report.toolchain.version, report.resolution.variant
    )
    .unwrap();
    writeln!(output, "{}", "=".repeat(50)).unwrap();
    writeln!(output).unwrap();

    for entry in &report.resolution.mapping {
        writeln!(output, "  {}", entry).unwrap();
    }

    writeln!(output).unwrap();
    let points = &report.resolution.mapping.entry_points;
    writeln!(output, "Analyzer: {}", points.analyzer).unwrap();
    writeln!(output, "Fixer:    {}", points.fixer).unwrap();

    output
}

/// Format a verification outcome.
pub fn format_verification(outcome: &VerificationOutcome, verbose: bool) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "Verify: fixture `{}` ({} exit codes)",
        outcome.fixture,
        outcome.convention.as_str()
    )
    .unwrap();

    for step in &outcome.steps {
        writeln!(output, "  [OK] {} ({:.2?})", step.step, step.duration).unwrap();
        if verbose {
            writeln!(output, "      {}", step.message).unwrap();
        }
    }

    if verbose {
        writeln!(output, "\nAnalyzer output:").unwrap();
        for line in outcome.analyzer_output.lines() {
            writeln!(output, "  | {}", line).unwrap();
        }
        writeln!(output, "\nFixer output:").unwrap();
        for line in outcome.fixer_output.lines() {
            writeln!(output, "  | {}", line).unwrap();
        }
    }

    writeln!(
        output,
        "\nResult: PASSED ({}, {} files edited)",
        outcome.verdict, outcome.edited_files
    )
    .unwrap();

    output
}

/// Format the result of an install.
pub fn format_install(report: &InstallReport, verbose: bool) -> String {
    let mut output = String::new();
    let installation = &report.installation;

    writeln!(
        output,
        "Installed include-what-you-use {} ({} layout) into {}",
        report.release.tool_version,
        installation.variant,
        installation.install_root().display()
    )
    .unwrap();
    writeln!(output, "  clang:    {}", report.toolchain.version).unwrap();
    writeln!(output, "  analyzer: {}", installation.analyzer.display()).unwrap();
    writeln!(output, "  fixer:    {}", installation.fixer.display()).unwrap();
    writeln!(output, "  tree:     {}", report.short_fingerprint()).unwrap();

    if verbose {
        writeln!(output, "\nEntries:").unwrap();
        for entry in &installation.entries {
            match &entry.source {
                Some(source) => writeln!(
                    output,
                    "  {:<9} {} -> {}",
                    entry.kind.as_str(),
                    entry.path.display(),
                    source.display()
                )
                .unwrap(),
                None => writeln!(output, "  {:<9} {}", entry.kind.as_str(), entry.path.display())
                    .unwrap(),
            }
        }
    }

    writeln!(output).unwrap();
    match &report.verification {
        Some(outcome) => output.push_str(&format_verification(outcome, verbose)),
        None => writeln!(output, "Verification skipped").unwrap(),
    }

    output
}
