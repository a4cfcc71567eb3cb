//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Signal { .. } => crate::exitcode::OSERR,
                InfraError::Application(e) => match e {
                    ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                    ApplicationError::Scaffold { .. } => crate::exitcode::CANTCREAT,
                    ApplicationError::ProgramNotFound { .. } => crate::exitcode::UNAVAILABLE,
                    ApplicationError::CommandFailed { .. } => crate::exitcode::SOFTWARE,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn given_failed_build_when_mapping_exit_code_then_software() {
        let err = CliError::from(ApplicationError::CommandFailed {
            command: "elm make".into(),
            exit_code: Some(1),
            stderr: String::new(),
        });
        assert_eq!(err.exit_code(), exitcode::SOFTWARE);
    }

    #[test]
    fn given_missing_program_when_mapping_exit_code_then_unavailable() {
        let err = CliError::from(ApplicationError::ProgramNotFound {
            program: "elm".into(),
        });
        assert_eq!(err.exit_code(), exitcode::UNAVAILABLE);
        assert_eq!(err.to_string(), "elm not found on PATH");
    }

    #[test]
    fn given_scaffold_failure_when_mapping_exit_code_then_cantcreat() {
        let err = CliError::from(ApplicationError::Scaffold {
            path: "emaki/elm.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });
        assert_eq!(err.exit_code(), exitcode::CANTCREAT);
        assert_ne!(err.exit_code(), exitcode::OK);
    }

    #[test]
    fn given_usage_error_when_mapping_exit_code_then_usage() {
        let err = CliError::Usage("run init first".into());
        assert_eq!(err.exit_code(), exitcode::USAGE);
    }
}
