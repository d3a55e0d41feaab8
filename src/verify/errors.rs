//! Verification error types and diagnostics.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Number of trailing captured lines shown in a diagnostic.
const CAPTURED_TAIL: usize = 20;

/// A stage of the verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyStep {
    WriteFixture,
    RunAnalyzer,
    AnalyzerExit,
    HeaderLookup,
    RunFixer,
    FixerReport,
    FixerExit,
}

impl fmt::Display for VerifyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerifyStep::WriteFixture => "write fixture",
            VerifyStep::RunAnalyzer => "run analyzer",
            VerifyStep::AnalyzerExit => "analyzer exit code",
            VerifyStep::HeaderLookup => "header lookup",
            VerifyStep::RunFixer => "run fixer",
            VerifyStep::FixerReport => "fixer report",
            VerifyStep::FixerExit => "fixer exit code",
        };
        f.write_str(name)
    }
}

/// Error raised by the verification harness.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("verification failed at {step}: {message}")]
    Assertion {
        step: VerifyStep,
        message: String,
        captured: String,
    },

    #[error("failed to run `{command}`")]
    Process {
        step: VerifyStep,
        command: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to write fixture into {}", dir.display())]
    Fixture {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl VerifyError {
    pub(crate) fn assertion(
        step: VerifyStep,
        message: impl Into<String>,
        captured: impl Into<String>,
    ) -> Self {
        VerifyError::Assertion {
            step,
            message: message.into(),
            captured: captured.into(),
        }
    }

    /// The step that failed.
    pub fn step(&self) -> VerifyStep {
        match self {
            VerifyError::Assertion { step, .. } | VerifyError::Process { step, .. } => *step,
            VerifyError::Fixture { .. } => VerifyStep::WriteFixture,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            VerifyError::Assertion {
                step,
                message,
                captured,
            } => {
                let mut diag =
                    Diagnostic::error(format!("verification failed at {}: {}", step, message));

                let lines: Vec<&str> = captured.lines().collect();
                let skip = lines.len().saturating_sub(CAPTURED_TAIL);
                if skip > 0 {
                    diag = diag.with_context(format!("... {} earlier lines omitted", skip));
                }
                for line in &lines[skip..] {
                    diag = diag.with_context(*line);
                }

                if *step == VerifyStep::HeaderLookup {
                    diag = diag
                        .with_suggestion("The lib/clang or include/c++ link does not match the host toolchain")
                        .with_suggestion(suggestions::REINSTALL);
                }
                diag.with_suggestion(suggestions::INSPECT_TREE)
            }

            VerifyError::Process {
                step,
                command,
                source,
            } => Diagnostic::error(format!("failed to run `{}` ({})", command, step))
                .with_context(source.to_string())
                .with_suggestion(suggestions::INSPECT_TREE),

            VerifyError::Fixture { dir, source } => {
                Diagnostic::error(format!("failed to write fixture into {}", dir.display()))
                    .with_context(source.to_string())
            }
        }
    }
}
