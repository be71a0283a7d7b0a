//! Data model for the two-tier container hierarchy and its hook/export APIs.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::events::HookEvent;

/// The two container tiers, fixed at the host boundary.
///
/// The tier is decided once, at the point the platform hands over a typed
/// reference; nothing downstream inspects type names at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerTier {
    /// Tier A: a top-level collection owning nested containers.
    Collection,
    /// Tier B: a content unit within a collection.
    Container,
}

/// A Tier A collection as observed during traversal or lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Absolute URL of the collection.
    pub url: String,
    /// Server-relative path, always starting with `/`.
    pub server_relative_path: String,
}

/// A Tier B container as observed during traversal or lookup.
///
/// Handles are plain owned values: dropping one releases the underlying
/// platform resource, so a traversal loop releases each container as its
/// iteration ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Absolute URL of the container.
    pub url: String,
    /// Server-relative path, always starting with `/`.
    pub server_relative_path: String,
    /// Leaf display name.
    pub name: String,
    /// True for the container that is the collection's home.
    pub is_root: bool,
    /// Number of direct descendant containers, computed at hand-off.
    pub child_count: usize,
}

/// A hook binding to be installed on a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookRegistration {
    /// Notification type the hook binds to.
    pub event: HookEvent,
    /// Fully qualified name of the handler type.
    pub class_name: String,
    /// Identity of the assembly carrying the handler.
    pub assembly_name: String,
    /// Configuration-supplied identity used to install and find-and-remove.
    pub sequence_number: i32,
}

/// Opaque identity the platform assigns to an installed hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An installed hook as returned by [`crate::traits::HookRegistry::list_registrations`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledHook {
    pub id: RegistrationId,
    pub registration: HookRegistration,
}

/// Export strategy for a container export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportMethod {
    /// Export the complete container contents.
    ExportAll,
}

/// How much security information an export carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncludeSecurity {
    /// All principals and permission assignments.
    All,
    /// No security information.
    None,
}

/// A single-container export job handed to the export engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportJob {
    pub method: ExportMethod,
    /// File name of the artifact, extension included.
    pub base_file_name: String,
    /// Directory the artifact is written into. Must already exist.
    pub file_location: PathBuf,
    pub exclude_dependencies: bool,
    pub include_security: IncludeSecurity,
    /// URL of the container being exported.
    pub container_url: String,
    /// Children are excluded from the job; each leaf is captured by its own
    /// deletion pass instead.
    pub exclude_children: bool,
}
