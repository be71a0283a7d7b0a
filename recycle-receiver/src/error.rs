//! Error taxonomy for the backup pipeline.
//!
//! Only [`Error::Host`] is ever recovered into a business-level Cancel, and
//! only inside the backup executor. Everything else is a defect-class failure
//! that propagates to the host.

use std::io;
use std::path::PathBuf;

use recycle_host::HostError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The settings document is missing or unreadable.
    #[error("error in reading configuration from {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// Permission was denied on the audit path; re-thrown with the path so
    /// operators can see what was refused.
    #[error("a security error occurred accessing {path}: {source}")]
    Security { path: PathBuf, source: io::Error },

    /// The elevated execution scope could not be entered.
    #[error("could not enter the elevated execution scope: {0}")]
    Elevation(#[source] HostError),

    /// A platform failure. Converted to a Cancel outcome inside the backup
    /// executor; fails fast anywhere else.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Filesystem failure outside the platform (directory creation, log
    /// open/append).
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
