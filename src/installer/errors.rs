//! Installation error types and diagnostics.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::EntryKind;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::Occupant;

/// Error while realizing a path mapping.
///
/// Whatever was built before the failure stays on disk; re-running the
/// installer after fixing the cause converges on the complete tree.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("source does not exist: {}", missing.display())]
    MissingSource { missing: PathBuf, destination: PathBuf },

    #[error("cannot create {} at {}: a {} is in the way", expected.as_str(), path.display(), found.as_str())]
    DestinationConflict {
        path: PathBuf,
        expected: EntryKind,
        found: Occupant,
    },

    #[error("refusing to write outside the install roots: {location}")]
    OutsideRoot { location: String },

    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        InstallError::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            InstallError::MissingSource {
                missing,
                destination,
            } => Diagnostic::error(format!("source does not exist: {}", missing.display()))
                .with_context(format!("needed for {}", destination.display()))
                .with_suggestion("Check that the bundle was fully extracted into `--bundle`")
                .with_suggestion(suggestions::REINSTALL),

            InstallError::DestinationConflict {
                path,
                expected,
                found,
            } => Diagnostic::error(format!(
                "cannot create {} at {}",
                expected.as_str(),
                path.display()
            ))
            .with_location(path)
            .with_context(format!("a {} already exists there", found.as_str()))
            .with_suggestion(format!(
                "Move or remove the existing {} and re-run the install",
                found.as_str()
            )),

            InstallError::OutsideRoot { location } => {
                Diagnostic::error("refusing to write outside the install roots")
                    .with_context(location.clone())
            }

            InstallError::Io { path, source } => {
                Diagnostic::error(format!("failed to write {}", path.display()))
                    .with_location(path)
                    .with_context(source.to_string())
                    .with_suggestion("Check permissions on the prefix and bin directories")
            }
        }
    }
}
