//! Failure taxonomy for environment operations.

use serde::Serialize;
use thiserror::Error;

/// Coarse classification the response envelope branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InputValidation,
    ProfileMissing,
    ProfileMalformed,
    InvalidEncoding,
    TableNotReady,
    RegistryReadFailure,
    ProvisioningFailure,
    RegistryWriteFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Necessary query string parameters not specified: {0}")]
    MissingParameters(String),

    #[error("Unsupported resource \"{0}\"")]
    UnsupportedResource(String),

    #[error("Profile name \"{0}\" is reserved")]
    ReservedProfile(String),

    #[error("Malformed request event: {0}")]
    MalformedEvent(String),

    #[error("Table {table} does not exist, try running \"eden config --push\"")]
    TableMissing { table: String },

    #[error("Table {table} status is \"{status}\", try again later")]
    TableTransitioning { table: String, status: String },

    #[error("{0}")]
    TableUnavailable(String),

    #[error("Profile {0} not found in remote table!")]
    ProfileMissing(String),

    #[error("{0}")]
    ProfileMalformed(String),

    #[error("JSON decode error in profile {profile}: {reason}")]
    InvalidEncoding { profile: String, reason: String },

    #[error("Registry lookup failed: {0}")]
    RegistryRead(String),

    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    #[error("Registry update failed after provisioning: {0}")]
    RegistryWrite(String),
}

impl LifecycleError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingParameters(_)
            | Self::UnsupportedResource(_)
            | Self::ReservedProfile(_)
            | Self::MalformedEvent(_) => FailureKind::InputValidation,
            Self::TableMissing { .. } | Self::TableTransitioning { .. } | Self::TableUnavailable(_) => {
                FailureKind::TableNotReady
            }
            Self::ProfileMissing(_) => FailureKind::ProfileMissing,
            Self::ProfileMalformed(_) => FailureKind::ProfileMalformed,
            Self::InvalidEncoding { .. } => FailureKind::InvalidEncoding,
            Self::RegistryRead(_) => FailureKind::RegistryReadFailure,
            Self::Provisioning(_) => FailureKind::ProvisioningFailure,
            Self::RegistryWrite(_) => FailureKind::RegistryWriteFailure,
        }
    }
}
