//! Traits the hosting platform implements for the backup pipeline.
//!
//! Any backend (the real platform object model, or [`crate::MemoryHost`] in
//! tests) implements these to give the pipeline container enumeration, hook
//! registration, export, elevation, and the system event log.

use std::path::Path;

use crate::error::Result;
use crate::types::{
    CollectionInfo, ContainerInfo, ExportJob, HookRegistration, InstalledHook, RegistrationId,
};

/// Enumeration and lookup over the two-tier container tree.
pub trait ContainerTree: Send + Sync {
    /// All collections under the application scope.
    fn collections(&self) -> Result<Vec<CollectionInfo>>;

    /// All containers in a collection, root first.
    fn containers(&self, collection: &CollectionInfo) -> Result<Vec<ContainerInfo>>;

    /// Open a single container from its absolute URL.
    fn open_container(&self, url: &str) -> Result<ContainerInfo>;

    /// Resolve the collection owning the given URL.
    fn lookup_collection(&self, url: &str) -> Result<CollectionInfo>;
}

/// Installed-hook management on individual containers.
pub trait HookRegistry: Send + Sync {
    /// Attach a hook to the container. Unconditional: the platform does not
    /// deduplicate registrations.
    fn add_registration(&self, container_url: &str, registration: &HookRegistration)
    -> Result<()>;

    /// All hooks currently attached to the container.
    fn list_registrations(&self, container_url: &str) -> Result<Vec<InstalledHook>>;

    /// Detach a hook by its platform-assigned id.
    fn remove_registration(&self, container_url: &str, id: RegistrationId) -> Result<()>;
}

/// Bit-level backup/export primitives. Both calls block until the artifact is
/// fully written.
pub trait ExportEngine: Send + Sync {
    /// Snapshot a whole collection to `destination`.
    fn backup_collection(
        &self,
        collection: &CollectionInfo,
        destination: &Path,
        overwrite: bool,
    ) -> Result<()>;

    /// Run a single-container export job synchronously.
    fn run_export(&self, job: &ExportJob) -> Result<()>;
}

/// The platform's system event log, written only on failure paths.
pub trait EventLog: Send + Sync {
    /// Create the named source if it does not exist yet.
    fn ensure_source(&self, source: &str) -> Result<()>;

    /// Append an Error-severity entry under the given source and event id.
    fn error(&self, source: &str, event_id: u32, message: &str) -> Result<()>;
}

/// Raw capability switch behind the elevated execution scope.
///
/// Consumers never call these directly; they go through
/// [`crate::elevation::ElevatedScope`] or [`crate::elevation::run_elevated`],
/// which guarantee [`Self::restore`] runs on every exit path.
pub trait PrivilegeBroker: Send + Sync {
    /// Widen the ambient capability. Not reentrant: elevating an already
    /// elevated broker is an error.
    fn elevate(&self) -> Result<()>;

    /// Restore the ambient capability.
    fn restore(&self);
}

/// The full platform surface the pipeline is generic over.
pub trait Host:
    ContainerTree + HookRegistry + ExportEngine + EventLog + PrivilegeBroker
{
}

impl<T> Host for T where
    T: ContainerTree + HookRegistry + ExportEngine + EventLog + PrivilegeBroker
{
}
