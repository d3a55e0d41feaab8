//! Test utilities and mocks for Berth unit tests.
//!
//! This module provides a mock process executor and on-disk fixtures for
//! code that probes toolchains or runs the installed tools.
//!
//! # Example
//!
//! ```rust,ignore
//! use berth::test_support::MockExecutor;
//! use berth::util::ProcessOutput;
//!
//! #[test]
//! fn test_example() {
//!     let mut exec = MockExecutor::new();
//!     exec.expect_contains("--version", ProcessOutput::success("clang version 3.9.1"));
//!
//!     // Pass `&mut exec` wherever an `Executor` is expected...
//! }
//! ```

pub mod fixtures;

use anyhow::{bail, Result};

use crate::util::process::{Executor, ProcessBuilder, ProcessOutput};

pub use fixtures::*;

/// Canned response for commands whose display form contains `needle`.
#[derive(Debug, Clone)]
struct Rule {
    needle: String,
    output: ProcessOutput,
    hits: usize,
}

/// A command seen by [`MockExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub command: String,
    pub stdin: Option<String>,
}

/// Executor that answers from canned outputs and records every call.
///
/// Rules are tried in the order they were added. A command no rule matches
/// gets the default output, or fails when there is none, the same way a
/// missing binary would.
#[derive(Debug, Default)]
pub struct MockExecutor {
    rules: Vec<Rule>,
    calls: Vec<RecordedCall>,
    default_output: Option<ProcessOutput>,
}

impl MockExecutor {
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Answer every command containing `needle`.
    pub fn expect_contains(&mut self, needle: &str, output: ProcessOutput) -> &mut Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            output,
            hits: 0,
        });
        self
    }

    /// Output for commands no rule matches.
    pub fn set_default(&mut self, output: ProcessOutput) -> &mut Self {
        self.default_output = Some(output);
        self
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Panic if any rule was never used.
    pub fn assert_all_used(&self) {
        for rule in &self.rules {
            assert!(rule.hits > 0, "no command matched `{}`", rule.needle);
        }
    }
}

impl Executor for MockExecutor {
    fn execute(&mut self, process: &ProcessBuilder) -> Result<ProcessOutput> {
        let command = process.display_command();
        self.calls.push(RecordedCall {
            command: command.clone(),
            stdin: process
                .get_stdin()
                .map(|s| String::from_utf8_lossy(s).into_owned()),
        });

        if let Some(rule) = self.rules.iter_mut().find(|r| command.contains(&r.needle)) {
            rule.hits += 1;
            return Ok(rule.output.clone());
        }

        match &self.default_output {
            Some(output) => Ok(output.clone()),
            None => bail!("unexpected command: {}", command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_rule_wins() {
        let mut exec = MockExecutor::new();
        exec.expect_contains("iwyu demo.cpp", ProcessOutput::new(6, "analyzer", ""));
        exec.expect_contains("iwyu", ProcessOutput::new(2, "other", ""));

        let first = exec
            .execute(&ProcessBuilder::new("iwyu").arg("demo.cpp"))
            .unwrap();
        let second = exec
            .execute(&ProcessBuilder::new("iwyu").arg("--version"))
            .unwrap();

        assert_eq!(first.code, Some(6));
        assert_eq!(second.code, Some(2));
        exec.assert_all_used();
    }

    #[test]
    fn test_records_stdin() {
        let mut exec = MockExecutor::new();
        exec.expect_contains("fix_include", ProcessOutput::success(""));

        exec.execute(&ProcessBuilder::new("fix_include").stdin("report"))
            .unwrap();

        assert_eq!(exec.calls()[0].stdin.as_deref(), Some("report"));
    }

    #[test]
    fn test_default_output() {
        let mut exec = MockExecutor::new();
        exec.set_default(ProcessOutput::success("clang version 3.9.1"));

        let output = exec
            .execute(&ProcessBuilder::new("/usr/bin/clang").arg("--version"))
            .unwrap();
        assert_eq!(output.stdout, "clang version 3.9.1");
    }

    #[test]
    fn test_unexpected_command_fails() {
        let mut exec = MockExecutor::new();
        assert!(exec.execute(&ProcessBuilder::new("rm")).is_err());
        assert_eq!(exec.calls().len(), 1);
    }
}
