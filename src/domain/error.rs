//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent violations of the scaffold's own rules.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate template path: {0}")]
    DuplicateTemplatePath(PathBuf),

    #[error("invalid template path {path}: {reason}")]
    InvalidTemplatePath { path: PathBuf, reason: String },

    #[error("empty command for {0}")]
    EmptyCommand(String),
}
