//! User-friendly diagnostic messages.
//!
//! Every fatal error carries the unmet condition, the literal paths or
//! strings involved, and where possible a suggested fix.

use std::fmt::{self, Write as _};
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no clang driver is found.
    pub const NO_TOOLCHAIN: &str =
        "Install clang, or point berth at it with `--clang` or `BERTH_CLANG`";

    /// Suggestion when the host toolchain changed since the last install.
    pub const REINSTALL: &str =
        "Re-run `berth install` after every host toolchain upgrade";

    /// Suggestion when verification fails.
    pub const INSPECT_TREE: &str =
        "The installed tree was left in place; inspect it or run `berth verify --verbose`";

    /// Suggestion when a release is unknown.
    pub const LIST_RELEASES: &str = "Run `berth releases` to see supported releases";
}

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    /// ANSI bold color code for the label.
    fn color(self) -> &'static str {
        match self {
            Severity::Error => "1;31",
            Severity::Warning => "1;33",
        }
    }
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

/// A message for the user: what went wrong, where, the facts behind it and
/// how to fix it.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    /// Facts shown under the message, one `|` line each
    pub context: Vec<String>,
    /// Numbered fixes
    pub suggestions: Vec<String>,
    /// The path the error is about
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Warning, message)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Render for a terminal, with ANSI colors when `color` is set.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();
        let label = paint(self.severity.label(), self.severity.color(), color);

        writeln!(output, "{}: {}", label, self.message).unwrap();
        if let Some(path) = &self.location {
            writeln!(output, "  --> {}", path.display()).unwrap();
        }

        // Captured process output spans many lines.
        for line in self.context.iter().flat_map(|c| c.lines()) {
            writeln!(output, "  | {}", line).unwrap();
        }

        if !self.suggestions.is_empty() {
            writeln!(output, "\n{}: consider:", paint("help", "1;32", color)).unwrap();
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(output, "  {}. {}", i + 1, suggestion).unwrap();
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
