//! Domain layer: templates and scaffold outcomes
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod template;

pub use entities::*;
pub use error::DomainError;
pub use template::{
    TemplateEntry, TemplateSet, ARTIFACT_DIR, ARTIFACT_INDEX, EMAKI_TEMPLATES, ENTRY_SOURCE,
};

/// Expand `~`, `$VAR` and `${VAR}` in a path-like string.
///
/// Returns the input unchanged when a variable cannot be resolved.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
