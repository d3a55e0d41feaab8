//! Verification harness.
//!
//! Runs the installed analyzer against a fixture, pipes its report into the
//! installed fixer, and checks both exit codes against what the fixture
//! predicts:
//!
//! 1. The analyzer exit code matches the release's exit convention for the
//!    fixture's suggestion count.
//! 2. The analyzer output has no `file not found` (a broken header link).
//! 3. The fixer reports `edited N file(s)` for the fixture's N.
//! 4. The fixer exits with N.
//!
//! The first failed check ends the run; nothing is cleaned up in the
//! installed tree.

mod errors;
mod exit_code;
mod fixture;

pub use errors::{VerifyError, VerifyStep};
pub use exit_code::{parse_fixer_report, AnalyzerVerdict, ExitCodeError};
pub use fixture::Fixture;

use std::time::{Duration, Instant};

use serde::Serialize;
use tempfile::TempDir;

use crate::core::ExitConvention;
use crate::installer::InstallationResult;
use crate::util::process::{Executor, ProcessBuilder, ProcessOutput};

/// Text the analyzer prints when a header cannot be resolved.
const MISSING_HEADER_MARKER: &str = "file not found";

/// A passed check with its timing.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: VerifyStep,
    pub message: String,
    #[serde(serialize_with = "serialize_duration_ms")]
    pub duration: Duration,
}

fn serialize_duration_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Everything observed during a successful verification.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    pub fixture: &'static str,
    pub convention: ExitConvention,
    pub analyzer_exit_code: i32,
    pub analyzer_output: String,
    pub verdict: AnalyzerVerdict,
    pub fixer_exit_code: i32,
    pub fixer_output: String,
    pub edited_files: u32,
    pub steps: Vec<StepReport>,
}

/// Drives the analyzer and fixer of an installation.
pub struct Harness<'a> {
    executor: &'a mut dyn Executor,
}

impl<'a> Harness<'a> {
    pub fn new(executor: &'a mut dyn Executor) -> Self {
        Harness { executor }
    }

    /// Verify `installation` against `fixture`.
    pub fn verify(
        &mut self,
        installation: &InstallationResult,
        fixture: &Fixture,
        convention: ExitConvention,
    ) -> Result<VerificationOutcome, VerifyError> {
        let mut steps = Vec::new();

        let started = Instant::now();
        let workdir = TempDir::new().map_err(|e| VerifyError::Fixture {
            dir: std::env::temp_dir(),
            source: e,
        })?;
        fixture
            .write_to(workdir.path())
            .map_err(|e| VerifyError::Fixture {
                dir: workdir.path().to_path_buf(),
                source: e,
            })?;
        steps.push(StepReport {
            step: VerifyStep::WriteFixture,
            message: format!("{} in {}", fixture.name, workdir.path().display()),
            duration: started.elapsed(),
        });

        // Analyzer
        let started = Instant::now();
        let analyzer = ProcessBuilder::new(&installation.analyzer)
            .arg(&fixture.main_source)
            .cwd(workdir.path());
        let output = self.run(&analyzer, VerifyStep::RunAnalyzer)?;
        let analyzer_output = output.combined();
        let analyzer_exit_code = exit_code(&output, VerifyStep::RunAnalyzer, &analyzer_output)?;
        tracing::debug!("analyzer exited with {}", analyzer_exit_code);

        let verdict = AnalyzerVerdict::classify(convention, analyzer_exit_code).map_err(|e| {
            VerifyError::assertion(VerifyStep::AnalyzerExit, e.to_string(), &analyzer_output)
        })?;
        let expected = convention.expected_analyzer_exit(fixture.expected_suggestions);
        if analyzer_exit_code != expected {
            return Err(VerifyError::assertion(
                VerifyStep::AnalyzerExit,
                format!(
                    "expected exit code {} ({} suggestions), got {} ({})",
                    expected, fixture.expected_suggestions, analyzer_exit_code, verdict
                ),
                analyzer_output,
            ));
        }
        steps.push(StepReport {
            step: VerifyStep::AnalyzerExit,
            message: format!("exit {}: {}", analyzer_exit_code, verdict),
            duration: started.elapsed(),
        });

        if analyzer_output.contains(MISSING_HEADER_MARKER) {
            return Err(VerifyError::assertion(
                VerifyStep::HeaderLookup,
                "the analyzer could not find a header",
                analyzer_output,
            ));
        }
        steps.push(StepReport {
            step: VerifyStep::HeaderLookup,
            message: "all headers resolved".to_string(),
            duration: Duration::ZERO,
        });

        // Fixer
        let started = Instant::now();
        let fixer = ProcessBuilder::new(&installation.fixer)
            .cwd(workdir.path())
            .stdin(analyzer_output.clone());
        let output = self.run(&fixer, VerifyStep::RunFixer)?;
        let fixer_output = output.combined();
        let fixer_exit_code = exit_code(&output, VerifyStep::RunFixer, &fixer_output)?;
        tracing::debug!("fixer exited with {}", fixer_exit_code);

        let edited_files = match parse_fixer_report(&fixer_output) {
            Some(n) => n,
            None => {
                return Err(VerifyError::assertion(
                    VerifyStep::FixerReport,
                    "no `edited N files` line in the fixer output",
                    fixer_output,
                ))
            }
        };
        if edited_files != fixture.expected_edited_files {
            return Err(VerifyError::assertion(
                VerifyStep::FixerReport,
                format!(
                    "expected {} edited files, fixer reported {}",
                    fixture.expected_edited_files, edited_files
                ),
                fixer_output,
            ));
        }
        steps.push(StepReport {
            step: VerifyStep::FixerReport,
            message: format!("edited {} files", edited_files),
            duration: started.elapsed(),
        });

        if i64::from(fixer_exit_code) != i64::from(edited_files) {
            return Err(VerifyError::assertion(
                VerifyStep::FixerExit,
                format!(
                    "fixer reported {} edited files but exited with {}",
                    edited_files, fixer_exit_code
                ),
                fixer_output,
            ));
        }
        steps.push(StepReport {
            step: VerifyStep::FixerExit,
            message: format!("exit {}", fixer_exit_code),
            duration: Duration::ZERO,
        });

        tracing::info!(
            "Verified {} with fixture `{}`",
            installation.analyzer.display(),
            fixture.name
        );

        Ok(VerificationOutcome {
            fixture: fixture.name,
            convention,
            analyzer_exit_code,
            analyzer_output,
            verdict,
            fixer_exit_code,
            fixer_output,
            edited_files,
            steps,
        })
    }

    fn run(
        &mut self,
        process: &ProcessBuilder,
        step: VerifyStep,
    ) -> Result<ProcessOutput, VerifyError> {
        tracing::debug!("{}: `{}`", step, process.display_command());
        self.executor
            .execute(process)
            .map_err(|e| VerifyError::Process {
                step,
                command: process.display_command(),
                source: e.into(),
            })
    }
}

fn exit_code(output: &ProcessOutput, step: VerifyStep, captured: &str) -> Result<i32, VerifyError> {
    output
        .code
        .ok_or_else(|| VerifyError::assertion(step, "terminated by a signal", captured))
}
