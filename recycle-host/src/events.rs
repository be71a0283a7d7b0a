//! Pending-delete notification payloads and outcomes.

use serde::{Deserialize, Serialize};

/// Notification types a deletion hook can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookEvent {
    /// A whole collection is about to be deleted (fired for root containers).
    CollectionDeleting,
    /// A nested container is about to be deleted.
    ContainerDeleting,
}

/// The business result of a pending-delete notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// Backup captured; the host may commit the deletion.
    Allow,
    /// Backup failed; the host must abort the deletion. Carries the
    /// diagnostic shown to the requesting user.
    Cancel(String),
}

/// Properties of a pending-delete notification.
///
/// The dispatch thread blocks on the handler: the deletion is not committed
/// until the handler returns. On Cancel the handler sets [`Self::cancel`] and
/// [`Self::error_message`] in addition to returning the outcome.
#[derive(Debug, Clone)]
pub struct DeletingProperties {
    /// Absolute URL of the doomed container.
    pub full_url: String,
    /// Server-relative path of the doomed container.
    pub server_relative_path: String,
    /// Login name of the principal requesting the deletion.
    pub user_login: String,
    /// Set by the handler to veto the deletion.
    pub cancel: bool,
    /// Diagnostic surfaced to the requesting user when vetoed.
    pub error_message: Option<String>,
}

impl DeletingProperties {
    pub fn new(
        full_url: impl Into<String>,
        server_relative_path: impl Into<String>,
        user_login: impl Into<String>,
    ) -> Self {
        Self {
            full_url: full_url.into(),
            server_relative_path: server_relative_path.into(),
            user_login: user_login.into(),
            cancel: false,
            error_message: None,
        }
    }

    /// Veto the deletion with the given diagnostic.
    pub fn deny(&mut self, message: impl Into<String>) {
        self.cancel = true;
        self.error_message = Some(message.into());
    }
}
