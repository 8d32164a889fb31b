//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::{InfraError, StoreError};

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

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
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(InfraError::Io { .. }) => exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => application_exit_code(e),
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(DomainError::NotFound(_)) => exitcode::NOINPUT,
        ApplicationError::Domain(_) => exitcode::DATAERR,
        ApplicationError::Store(StoreError::Io { .. } | StoreError::Serde { .. }) => {
            exitcode::IOERR
        }
        ApplicationError::Store(StoreError::MissingNode(_)) => exitcode::NOINPUT,
        ApplicationError::Store(StoreError::Poisoned) => exitcode::SOFTWARE,
        ApplicationError::Store(_) => exitcode::DATAERR,
        ApplicationError::MissingLocation => exitcode::USAGE,
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::OperationFailed { .. } => exitcode::SOFTWARE,
    }
}
