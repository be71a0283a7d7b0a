/*!
Hook installation and removal across the container tree
*/

use recycle_host::{ContainerInfo, HookEvent, HookRegistration, Host};
use tracing::info;

use crate::core::config::Settings;
use crate::core::receiver::RECEIVER_CLASS;
use crate::error::Result;

/// Installs and removes the deletion hooks when the capability is toggled.
///
/// Traversal is depth-first and fail-fast: an error on any container aborts
/// the remaining walk. Container handles are owned values, released as each
/// loop iteration ends; the collection follows once its containers are done.
pub struct HookLifecycle<'a, H: Host> {
    host: &'a H,
    settings: &'a Settings,
}

impl<'a, H: Host> HookLifecycle<'a, H> {
    pub fn new(host: &'a H, settings: &'a Settings) -> Self {
        Self { host, settings }
    }

    /// Register the deletion hook on every container under the application
    /// scope.
    pub fn install(&self) -> Result<()> {
        let mut installed = 0usize;
        for collection in self.host.collections()? {
            for container in self.host.containers(&collection)? {
                self.install_container(&container)?;
                installed += 1;
            }
        }
        info!(containers = installed, "deletion hooks installed");
        Ok(())
    }

    /// Register the deletion hook on a single container, for capabilities
    /// activated at container scope.
    ///
    /// Unconditional: installing twice accumulates duplicate registrations
    /// with the same sequence number. Uninstall removes them all.
    pub fn install_container(&self, container: &ContainerInfo) -> Result<()> {
        let registration = HookRegistration {
            event: if container.is_root {
                HookEvent::CollectionDeleting
            } else {
                HookEvent::ContainerDeleting
            },
            class_name: RECEIVER_CLASS.to_string(),
            assembly_name: self.settings.assembly_name.clone(),
            sequence_number: self.settings.sequence_number,
        };
        self.host.add_registration(&container.url, &registration)?;
        Ok(())
    }

    /// Remove every matching hook from every container under the application
    /// scope.
    pub fn uninstall(&self) -> Result<()> {
        let mut visited = 0usize;
        for collection in self.host.collections()? {
            for container in self.host.containers(&collection)? {
                self.uninstall_container(&container)?;
                visited += 1;
            }
        }
        info!(containers = visited, "deletion hooks removed");
        Ok(())
    }

    /// Remove every hook whose sequence number matches the configured one.
    pub fn uninstall_container(&self, container: &ContainerInfo) -> Result<()> {
        for hook in self.host.list_registrations(&container.url)? {
            if hook.registration.sequence_number == self.settings.sequence_number {
                self.host.remove_registration(&container.url, hook.id)?;
            }
        }
        Ok(())
    }
}
