use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

/// Terminal failures of a single export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The source artifact is missing, undecodable or has an unusable shape.
    #[error("source model `{name}` is unavailable: {reason}")]
    SourceUnavailable { name: String, reason: String },

    /// Coefficient rows and intercepts disagree on the output dimension.
    #[error("{output_dim} coefficient rows but {n_intercepts} intercepts")]
    ShapeMismatch { output_dim: usize, n_intercepts: usize },

    #[error("failed to write `{}`", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
}

impl ExportError {
    pub fn source_unavailable(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write_failure(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            error,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::SourceUnavailable { .. } => ExitCode::from(3),
            Self::ShapeMismatch { .. } => ExitCode::from(4),
            Self::WriteFailure { .. } => ExitCode::from(5),
        }
    }
}
