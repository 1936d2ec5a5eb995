//! Domain-level error taxonomy for typelift.

use std::path::PathBuf;

/// typelift domain errors.
#[derive(Debug, thiserror::Error)]
pub enum TypeliftError {
    #[error("invalid strictness level: {level}")]
    InvalidLevel { level: String },

    #[error("checker invocation failed: {reason}")]
    CheckerInvocation { reason: String },

    #[error("no sigil found in {}", path.display())]
    SigilNotFound { path: PathBuf },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for typelift domain operations.
pub type Result<T> = std::result::Result<T, TypeliftError>;
