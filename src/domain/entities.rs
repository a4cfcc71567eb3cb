//! Domain entities: core data structures

use std::fmt;
use std::path::PathBuf;

use crate::domain::DomainError;

/// What happened to one template entry during `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// File did not exist and was created.
    Generated,
    /// File existed and the operator approved replacing it.
    Overwritten,
    /// File existed and the operator kept it.
    Skipped,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WriteOutcome::Generated => "generated",
            WriteOutcome::Overwritten => "overwritten",
            WriteOutcome::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// Outcome for a single entry, with the path as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    /// Path relative to the project root (template identity)
    pub relative_path: PathBuf,
    /// Path relative to the invocation directory, or absolute
    pub display_path: PathBuf,
    pub outcome: WriteOutcome,
}

impl EntryOutcome {
    /// Status line (`<path> ... generated`). Skipped entries stay silent.
    pub fn status_line(&self) -> Option<String> {
        self.status_line_with(|outcome| outcome)
    }

    /// Status line with the outcome label rendered by `label`, e.g. colored.
    pub fn status_line_with<L, F>(&self, label: F) -> Option<String>
    where
        L: fmt::Display,
        F: FnOnce(WriteOutcome) -> L,
    {
        match self.outcome {
            WriteOutcome::Skipped => None,
            outcome => Some(format!(
                "{} ... {}",
                self.display_path.display(),
                label(outcome)
            )),
        }
    }
}

/// Per-entry results of one `init` run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub entries: Vec<EntryOutcome>,
}

impl InitReport {
    pub fn count(&self, outcome: WriteOutcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }

    pub fn outcome_of(&self, relative_path: &str) -> Option<WriteOutcome> {
        self.entries
            .iter()
            .find(|e| e.relative_path == PathBuf::from(relative_path))
            .map(|e| e.outcome)
    }
}

/// External program plus leading arguments, spawned without a shell.
///
/// `["npx", "elm"]` runs `npx` with `elm` as its first argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Build from an argument vector; `name` labels the error if it is empty.
    pub fn from_argv(name: &str, argv: &[String]) -> Result<Self, DomainError> {
        let mut parts = argv.iter().filter(|s| !s.trim().is_empty());
        let program = parts
            .next()
            .ok_or_else(|| DomainError::EmptyCommand(name.to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: parts.cloned().collect(),
        })
    }

    /// Same program with `extra` appended to the arguments.
    pub fn with_args<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = self.args.clone();
        args.extend(extra.into_iter().map(Into::into));
        Self {
            program: self.program.clone(),
            args,
        }
    }

    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
