//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::core::{find_release, ToolRelease, RELEASES};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while looking up what to install.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown release `{requested}`")]
    UnknownRelease {
        requested: String,
        known: Vec<String>,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::UnknownRelease { requested, known } => {
                let mut diag = Diagnostic::error(format!("unknown release `{}`", requested));

                if !known.is_empty() {
                    diag = diag.with_context(format!("known releases: {}", known.join(", ")));
                }

                if let Some(close) = known
                    .iter()
                    .find(|k| k.starts_with(requested.as_str()) || requested.starts_with(k.as_str()))
                {
                    diag = diag.with_suggestion(format!("Did you mean `{}`?", close));
                }

                diag.with_suggestion(suggestions::LIST_RELEASES)
            }
        }
    }
}

/// Look up a release, failing with the list of known ones.
pub fn lookup_release(requested: &str) -> Result<&'static ToolRelease, ResolveError> {
    find_release(requested).ok_or_else(|| ResolveError::UnknownRelease {
        requested: requested.to_string(),
        known: RELEASES.iter().map(|r| r.tool_version.to_string()).collect(),
    })
}
