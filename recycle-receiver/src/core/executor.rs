/*!
Backup execution under the elevated scope
*/

use recycle_host::{
    ContainerTier, DeletingProperties, DeletionOutcome, ExportJob, ExportMethod, Host,
    IncludeSecurity, run_elevated,
};
use tracing::{info, warn};

use crate::core::config::Settings;
use crate::core::naming;
use crate::error::{Error, Result};

/// Runs the backup for one doomed container.
///
/// Destination resolution, directory creation and the backup call all happen
/// inside one elevated scope; ambient capability is restored on every exit
/// path before the outcome is returned.
pub struct BackupExecutor<'a, H: Host> {
    host: &'a H,
    settings: &'a Settings,
}

impl<'a, H: Host> BackupExecutor<'a, H> {
    pub fn new(host: &'a H, settings: &'a Settings) -> Self {
        Self { host, settings }
    }

    /// Back the doomed container up according to its tier.
    ///
    /// The tier was fixed when the platform handed over a typed notification;
    /// nothing here inspects type names at runtime.
    pub fn backup(&self, tier: ContainerTier, props: &DeletingProperties) -> Result<DeletionOutcome> {
        match tier {
            ContainerTier::Collection => self.collection_backup(props),
            ContainerTier::Container => self.container_backup(props),
        }
    }

    /// Tier A: snapshot the whole collection owning the doomed container.
    fn collection_backup(&self, props: &DeletingProperties) -> Result<DeletionOutcome> {
        if props.server_relative_path.trim_matches('/').is_empty() {
            return Ok(DeletionOutcome::Cancel(format!(
                "Root site collection backup prohibited {}",
                props.full_url
            )));
        }
        let attempt =
            run_elevated(self.host, || self.export_collection(props)).map_err(Error::Elevation)?;
        self.finish(attempt)
    }

    /// Tier B: export the single container, unless it is an intermediate
    /// node of a cascading delete.
    fn container_backup(&self, props: &DeletingProperties) -> Result<DeletionOutcome> {
        let attempt =
            run_elevated(self.host, || self.export_container(props)).map_err(Error::Elevation)?;
        self.finish(attempt)
    }

    fn finish(&self, attempt: Result<()>) -> Result<DeletionOutcome> {
        match attempt {
            Ok(()) => Ok(DeletionOutcome::Allow),
            Err(Error::Host(cause)) => {
                warn!(%cause, "platform backup failure");
                Ok(DeletionOutcome::Cancel(format!(
                    "The backup operation terminated abnormally due to {cause}"
                )))
            }
            Err(fatal) => Err(fatal),
        }
    }

    fn export_collection(&self, props: &DeletingProperties) -> Result<()> {
        let destination = naming::collection_destination(
            &self.settings.backup_folder,
            &props.server_relative_path,
        )?;
        let collection = self.host.lookup_collection(&props.full_url)?;
        self.host
            .backup_collection(&collection, &destination.full_path(), true)?;
        Ok(())
    }

    fn export_container(&self, props: &DeletingProperties) -> Result<()> {
        let container = self.host.open_container(&props.full_url)?;
        if !container.is_root && container.child_count > 0 {
            // Intermediate node of a cascading delete: each leaf is captured
            // by its own pass, the subtree root by the collection backup.
            info!(url = %props.full_url, "intermediate container, export skipped");
            return Ok(());
        }

        let destination = naming::container_destination(
            &self.settings.backup_folder,
            &props.server_relative_path,
            &container.name,
        )?;
        let job = ExportJob {
            method: ExportMethod::ExportAll,
            base_file_name: destination.file_name,
            file_location: destination.directory,
            exclude_dependencies: false,
            include_security: IncludeSecurity::All,
            container_url: container.url.clone(),
            exclude_children: true,
        };
        self.host.run_export(&job)?;
        Ok(())
    }
}
