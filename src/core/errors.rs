use std::result::Result as StdResult;

use thiserror::Error;

use crate::core::services::ServiceError;

/// Unified error type for core/domain/storage layers.
#[derive(Error, Debug)]
pub enum TuitionError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, TuitionError>;

impl From<std::io::Error> for TuitionError {
    fn from(err: std::io::Error) -> Self {
        TuitionError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for TuitionError {
    fn from(err: serde_json::Error) -> Self {
        TuitionError::Storage(err.to_string())
    }
}

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] TuitionError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<ServiceError> for CliError {
    fn from(err: ServiceError) -> Self {
        CliError::Core(TuitionError::from(err))
    }
}
