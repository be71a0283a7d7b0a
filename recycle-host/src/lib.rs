/*!
Hosting-platform boundary for the site recycle bin.

This crate defines everything the backup pipeline needs from the platform
that owns the container tree: the two-tier data model, pending-delete
notification properties, the hook registration API, the export engine, the
elevated-execution primitive, and the system event log. `MemoryHost`
implements the whole surface in memory for tests and short-lived tooling.
*/

pub mod elevation;
pub mod error;
pub mod events;
pub mod memory;
pub mod traits;
pub mod types;

pub use elevation::{ElevatedScope, run_elevated};
pub use error::{HostError, Result};
pub use events::{DeletingProperties, DeletionOutcome, HookEvent};
pub use memory::{LoggedEvent, MemoryHost};
pub use traits::{ContainerTree, EventLog, ExportEngine, Host, HookRegistry, PrivilegeBroker};
pub use types::{
    CollectionInfo, ContainerInfo, ContainerTier, ExportJob, ExportMethod, HookRegistration,
    IncludeSecurity, InstalledHook, RegistrationId,
};
