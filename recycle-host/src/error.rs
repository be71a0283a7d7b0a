//! Error type for platform operations.
//!
//! `HostError` is the recognized platform-failure category: the one class of
//! failure the deletion interceptor converts into a business-level Cancel.
//! Everything outside it (configuration, filesystem, security) belongs to the
//! consuming crate and surfaces loudly.

use thiserror::Error;

use crate::types::RegistrationId;

/// Failures raised by the hosting platform.
#[derive(Debug, Error)]
pub enum HostError {
    /// No collection owns the given URL.
    #[error("no collection owns url {url}")]
    CollectionNotFound { url: String },

    /// The container could not be opened from its URL.
    #[error("container not found: {url}")]
    ContainerNotFound { url: String },

    /// The whole-collection backup primitive failed.
    #[error("backup of {url} failed: {reason}")]
    Backup { url: String, reason: String },

    /// A container export job failed.
    #[error("export of {url} failed: {reason}")]
    Export { url: String, reason: String },

    /// A hook registration id did not resolve on the container.
    #[error("registration {0} not found")]
    RegistrationNotFound(RegistrationId),

    /// The elevated scope was entered while already held.
    #[error("elevated execution scope is not reentrant")]
    ElevationReentered,

    /// The system event log rejected a write.
    #[error("event log: {0}")]
    EventLog(String),
}

/// Convenience alias for platform operations.
pub type Result<T> = std::result::Result<T, HostError>;
