//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::domain::{EntryOutcome, WriteOutcome};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print plain output (no color, for data such as TOML or paths)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print the `<path> ... generated` line for one scaffolded file.
///
/// Skipped files print nothing.
pub fn entry_status(entry: &EntryOutcome) {
    let line = entry.status_line_with(|outcome| match outcome {
        WriteOutcome::Overwritten => outcome.to_string().yellow(),
        _ => outcome.to_string().green(),
    });
    if let Some(line) = line {
        println!("{}", line);
    }
}
