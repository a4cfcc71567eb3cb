//! Build invoker: compiles the emaki entry point with the Elm compiler.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{CommandSpec, ARTIFACT_INDEX, ENTRY_SOURCE};
use crate::infrastructure::traits::CommandRunner;

/// Runs `<compiler> make src/Main.elm --output=output/index.html` in the project root.
pub struct BuildService {
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl BuildService {
    /// Create a new build service.
    pub fn new(cmd: Arc<dyn CommandRunner>, settings: Arc<Settings>) -> Self {
        Self { cmd, settings }
    }

    /// Full compiler invocation, program first.
    pub fn command(&self) -> ApplicationResult<CommandSpec> {
        let compiler = self.settings.compiler_command()?;
        Ok(compiler.with_args([
            "make".to_string(),
            ENTRY_SOURCE.to_string(),
            format!("--output={}", ARTIFACT_INDEX),
        ]))
    }

    /// Compile once; fails if the compiler is missing or exits non-zero.
    pub fn build(&self, root: &Path) -> ApplicationResult<()> {
        let command = self.command()?;
        debug!("build: root={}, command={}", root.display(), command);

        let output = self
            .cmd
            .run_in(root, &command.program, &command.arg_refs())
            .map_err(|e| spawn_error(&command, root, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            // elm reports compile errors on stderr; some wrappers use stdout
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(ApplicationError::CommandFailed {
                command: command.to_string(),
                exit_code: output.status.code(),
                stderr: detail.into_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("build: {}", stdout.trim());
        }
        info!("built {}", root.join(ARTIFACT_INDEX).display());
        Ok(())
    }
}

/// Map a failure to start a program onto the application error.
pub(crate) fn spawn_error(command: &CommandSpec, root: &Path, e: io::Error) -> ApplicationError {
    if e.kind() == io::ErrorKind::NotFound {
        ApplicationError::ProgramNotFound {
            program: command.program.clone(),
        }
    } else {
        ApplicationError::OperationFailed {
            context: format!("run `{}` in {}", command, root.display()),
            source: Box::new(e),
        }
    }
}
