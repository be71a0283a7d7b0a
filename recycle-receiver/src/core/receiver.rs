/*!
The deletion interceptor
*/

use recycle_host::{ContainerTier, DeletingProperties, DeletionOutcome, Host};
use tracing::{error, info};

use crate::core::audit::AuditSink;
use crate::core::config::Settings;
use crate::core::executor::BackupExecutor;
use crate::error::Result;

/// Source name used for system event log entries.
pub const EVENT_SOURCE: &str = "Site Recycle Bin";

/// Event id stamped on backup-failure entries.
pub const BACKUP_FAILED_EVENT_ID: u32 = 1000;

/// Fully qualified handler name stamped into hook registrations.
pub const RECEIVER_CLASS: &str = "recycle_receiver::core::receiver::DeleteEventReceiver";

/// Handles pending-delete notifications: backs the doomed container up, logs
/// the attempt, and allows or vetoes the deletion.
///
/// One notification drives exactly one pass; there are no internal retries.
/// The dispatch thread blocks until the backup finishes or fails.
pub struct DeleteEventReceiver<'a, H: Host> {
    host: &'a H,
    settings: &'a Settings,
    audit: &'a AuditSink,
}

impl<'a, H: Host> DeleteEventReceiver<'a, H> {
    pub fn new(host: &'a H, settings: &'a Settings, audit: &'a AuditSink) -> Self {
        Self {
            host,
            settings,
            audit,
        }
    }

    /// A whole collection is about to be deleted.
    pub fn on_collection_deleting(
        &self,
        props: &mut DeletingProperties,
    ) -> Result<DeletionOutcome> {
        self.host.ensure_source(EVENT_SOURCE)?;
        info!(url = %props.full_url, user = %props.user_login, "collection delete intercepted");
        self.audit.append(&format!(
            "Entering collection delete on {}. Requested by user: {}",
            props.full_url, props.user_login
        ))?;

        let executor = BackupExecutor::new(self.host, self.settings);
        match executor.backup(ContainerTier::Collection, props)? {
            DeletionOutcome::Allow => {
                self.audit.append(&format!(
                    "Backup and delete of collection {} completed successfully.",
                    props.full_url
                ))?;
                Ok(DeletionOutcome::Allow)
            }
            DeletionOutcome::Cancel(diagnostic) => self.veto(props, diagnostic),
        }
    }

    /// A nested container is about to be deleted.
    pub fn on_container_deleting(
        &self,
        props: &mut DeletingProperties,
    ) -> Result<DeletionOutcome> {
        self.host.ensure_source(EVENT_SOURCE)?;
        info!(url = %props.full_url, user = %props.user_login, "container delete intercepted");
        self.audit.append(&format!(
            "Entering container delete on {}. Requested by user: {}",
            props.full_url, props.user_login
        ))?;

        let executor = BackupExecutor::new(self.host, self.settings);
        match executor.backup(ContainerTier::Container, props)? {
            DeletionOutcome::Allow => {
                self.audit.append(&format!(
                    "Backup and delete of container {} completed successfully.",
                    props.full_url
                ))?;
                Ok(DeletionOutcome::Allow)
            }
            DeletionOutcome::Cancel(diagnostic) => self.veto(props, diagnostic),
        }
    }

    /// Record the failure in both sinks and block the deletion.
    fn veto(&self, props: &mut DeletingProperties, diagnostic: String) -> Result<DeletionOutcome> {
        error!(url = %props.full_url, %diagnostic, "backup failed, cancelling deletion");
        self.host
            .error(EVENT_SOURCE, BACKUP_FAILED_EVENT_ID, &diagnostic)?;
        self.audit.append(&diagnostic)?;
        props.deny(diagnostic.clone());
        Ok(DeletionOutcome::Cancel(diagnostic))
    }
}
