use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] pulse_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No marker description provided")]
    EmptyDescription,
    #[error("Marker ID cannot be empty")]
    EmptyMarkerId,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Unknown region: {0}")]
    UnknownRegion(String),
    #[error("{0}")]
    Rejected(String),
}

impl From<pulse_core::error::ConfigError> for CliError {
    fn from(error: pulse_core::error::ConfigError) -> Self {
        Self::Core(error.into())
    }
}
