//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};

use is_terminal::IsTerminal;
use tracing::{debug, warn};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Write a new file; fails with `ErrorKind::AlreadyExists` if `path` exists.
    fn write_new(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Write string content to file, replacing any previous content.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command in `dir` to completion, capturing stdout and stderr.
    fn run_in(&self, dir: &Path, cmd: &str, args: &[&str]) -> io::Result<Output>;

    /// Start a command in `dir` with stdout and stderr piped back to the caller.
    ///
    /// On Unix the child leads a new process group whose id is its pid.
    fn spawn_piped(&self, dir: &Path, cmd: &str, args: &[&str]) -> io::Result<Child>;
}

/// Yes/no question put to the operator.
pub trait ConfirmationPrompt: Send + Sync {
    /// Ask `message`; `false` unless the operator explicitly agrees.
    fn ask(&self, message: &str) -> io::Result<bool>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write_new(&self, path: &Path, content: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(content.as_bytes())?;
        file.flush()
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }
}

/// Real command runner implementation.
///
/// Programs are resolved through `PATH` before spawning, so wrappers such as
/// `npx.cmd` are found on Windows and a missing binary surfaces as `NotFound`.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    fn command(&self, dir: &Path, cmd: &str, args: &[&str]) -> io::Result<Command> {
        let program = which::which(cmd).map_err(|e| {
            io::Error::new(io::ErrorKind::NotFound, format!("{}: {}", cmd, e))
        })?;
        debug!("resolved {} to {}", cmd, program.display());

        let mut command = Command::new(program);
        command.args(args).current_dir(dir);
        Ok(command)
    }
}

impl CommandRunner for RealCommandRunner {
    fn run_in(&self, dir: &Path, cmd: &str, args: &[&str]) -> io::Result<Output> {
        self.command(dir, cmd, args)?
            .stdin(Stdio::null())
            .output()
    }

    fn spawn_piped(&self, dir: &Path, cmd: &str, args: &[&str]) -> io::Result<Child> {
        let mut command = self.command(dir, cmd, args)?;
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // own process group, so wrappers like `npx serve` are stopped with their children
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        command.spawn()
    }
}

/// Terminal yes/no prompt, defaulting to "no".
///
/// Without an interactive stdin the answer is "no", so existing files are kept.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl ConfirmationPrompt for TerminalPrompt {
    fn ask(&self, message: &str) -> io::Result<bool> {
        if !io::stdin().is_terminal() {
            warn!("stdin is not a terminal, answering no: {}", message);
            return Ok(false);
        }

        dialoguer::Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .map_err(io::Error::other)
    }
}

/// Prompt that agrees to everything (`--yes`).
#[derive(Debug, Default)]
pub struct AssumeYes;

impl ConfirmationPrompt for AssumeYes {
    fn ask(&self, message: &str) -> io::Result<bool> {
        debug!("assuming yes: {}", message);
        Ok(true)
    }
}
