//! Exit-code interpretation for the analyzer and the fixer.
//!
//! The analyzer's exit code is a count, not a pass/fail flag: under the
//! plus-two convention a clean file exits 2 and every suggested edit adds
//! one. Legacy releases exit 1 whenever the analysis ran. The fixer exits
//! with the number of files it edited.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::core::ExitConvention;

static EDITED_FILES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"edited (\d+) files?").unwrap());

/// What an analyzer exit code says about the analyzed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "suggestions", rename_all = "kebab-case")]
pub enum AnalyzerVerdict {
    /// Nothing to change.
    Clean,
    /// This many include edits were suggested.
    Edits(u32),
    /// The release does not encode a count in its exit code.
    Unreported,
}

impl AnalyzerVerdict {
    /// Interpret `code` under `convention`.
    pub fn classify(convention: ExitConvention, code: i32) -> Result<Self, ExitCodeError> {
        match convention {
            ExitConvention::PlusTwo => match code {
                2 => Ok(AnalyzerVerdict::Clean),
                n if n > 2 => Ok(AnalyzerVerdict::Edits((n - 2) as u32)),
                _ => Err(ExitCodeError { convention, code }),
            },
            ExitConvention::Legacy => match code {
                1 => Ok(AnalyzerVerdict::Unreported),
                _ => Err(ExitCodeError { convention, code }),
            },
        }
    }

    /// Number of suggested edits, when the exit code carries one.
    pub fn suggestions(self) -> Option<u32> {
        match self {
            AnalyzerVerdict::Clean => Some(0),
            AnalyzerVerdict::Edits(n) => Some(n),
            AnalyzerVerdict::Unreported => None,
        }
    }
}

impl std::fmt::Display for AnalyzerVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerVerdict::Clean => write!(f, "clean"),
            AnalyzerVerdict::Edits(1) => write!(f, "1 edit suggested"),
            AnalyzerVerdict::Edits(n) => write!(f, "{} edits suggested", n),
            AnalyzerVerdict::Unreported => write!(f, "analysis ran (count not reported)"),
        }
    }
}

/// An exit code that means the analysis itself did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("exit code {code} is not a valid {} analyzer result", convention.as_str())]
pub struct ExitCodeError {
    pub convention: ExitConvention,
    pub code: i32,
}

/// Number of files the fixer says it edited.
///
/// Looks for `edited N file(s)`; legacy fixers print `no changes` instead
/// of `edited 0 files`.
pub fn parse_fixer_report(output: &str) -> Option<u32> {
    if let Some(caps) = EDITED_FILES.captures(output) {
        return caps[1].parse().ok();
    }
    output.to_lowercase().contains("no changes").then_some(0)
}
