//! In-memory host for tests and ephemeral tooling.
//!
//! [`MemoryHost`] keeps the container tree and hook registrations in memory
//! but writes real artifacts: its export engine serializes a JSON manifest to
//! the requested destination, so naming and collision behavior can be
//! observed on a real filesystem. Exports are refused outside an elevated
//! scope, and event-log writes are recorded for assertions.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use serde::Serialize;
use tracing::debug;

use crate::error::{HostError, Result};
use crate::traits::{ContainerTree, EventLog, ExportEngine, HookRegistry, PrivilegeBroker};
use crate::types::{
    CollectionInfo, ContainerInfo, ExportJob, HookRegistration, InstalledHook, RegistrationId,
};

/// An entry recorded by the in-memory event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedEvent {
    pub source: String,
    pub event_id: u32,
    pub message: String,
}

struct ContainerSeed {
    url: String,
    server_relative_path: String,
    name: String,
    is_root: bool,
}

struct CollectionRecord {
    info: CollectionInfo,
    containers: Vec<ContainerSeed>,
}

#[derive(Default)]
struct TreeState {
    collections: Vec<CollectionRecord>,
    registrations: HashMap<String, Vec<InstalledHook>>,
}

/// In-memory implementation of the full host surface.
pub struct MemoryHost {
    state: RwLock<TreeState>,
    elevated: AtomicBool,
    next_registration: AtomicU64,
    export_failure: Mutex<Option<String>>,
    sources: Mutex<HashSet<String>>,
    events: Mutex<Vec<LoggedEvent>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(TreeState::default()),
            elevated: AtomicBool::new(false),
            next_registration: AtomicU64::new(1),
            export_failure: Mutex::new(None),
            sources: Mutex::new(HashSet::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Add a Tier A collection under the application scope.
    pub fn add_collection(&self, url: impl Into<String>, server_relative_path: impl Into<String>) {
        let mut state = self.write_state();
        state.collections.push(CollectionRecord {
            info: CollectionInfo {
                url: url.into(),
                server_relative_path: server_relative_path.into(),
            },
            containers: Vec::new(),
        });
    }

    /// Add a Tier B container to an existing collection.
    pub fn add_container(
        &self,
        collection_url: &str,
        url: impl Into<String>,
        server_relative_path: impl Into<String>,
        name: impl Into<String>,
        is_root: bool,
    ) -> Result<()> {
        let mut state = self.write_state();
        let record = state
            .collections
            .iter_mut()
            .find(|c| c.info.url == collection_url)
            .ok_or_else(|| HostError::CollectionNotFound {
                url: collection_url.to_string(),
            })?;
        record.containers.push(ContainerSeed {
            url: url.into(),
            server_relative_path: server_relative_path.into(),
            name: name.into(),
            is_root,
        });
        Ok(())
    }

    /// Make every subsequent export fail with the given reason, or clear the
    /// injected fault with `None`.
    pub fn set_export_failure(&self, reason: Option<&str>) {
        *self
            .export_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = reason.map(str::to_string);
    }

    /// Entries written to the event log so far.
    pub fn events(&self) -> Vec<LoggedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether the broker currently holds the elevated capability.
    pub fn is_elevated(&self) -> bool {
        self.elevated.load(Ordering::SeqCst)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, TreeState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, TreeState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn injected_failure(&self) -> Option<String> {
        self.export_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn require_elevation(&self, url: &str, export: bool) -> Result<()> {
        if self.is_elevated() {
            return Ok(());
        }
        let reason = "access is denied outside an elevated scope".to_string();
        if export {
            Err(HostError::Export {
                url: url.to_string(),
                reason,
            })
        } else {
            Err(HostError::Backup {
                url: url.to_string(),
                reason,
            })
        }
    }

    fn materialize(seed: &ContainerSeed, siblings: &[ContainerSeed]) -> ContainerInfo {
        let child_count = siblings
            .iter()
            .filter(|s| parent_path(&s.server_relative_path) == seed.server_relative_path)
            .count();
        ContainerInfo {
            url: seed.url.clone(),
            server_relative_path: seed.server_relative_path.clone(),
            name: seed.name.clone(),
            is_root: seed.is_root,
            child_count,
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything before the last separator, so `/sites/finance/teamA` parents to
/// `/sites/finance`.
fn parent_path(server_relative_path: &str) -> &str {
    match server_relative_path.rfind('/') {
        Some(idx) => &server_relative_path[..idx],
        None => "",
    }
}

impl ContainerTree for MemoryHost {
    fn collections(&self) -> Result<Vec<CollectionInfo>> {
        Ok(self
            .read_state()
            .collections
            .iter()
            .map(|c| c.info.clone())
            .collect())
    }

    fn containers(&self, collection: &CollectionInfo) -> Result<Vec<ContainerInfo>> {
        let state = self.read_state();
        let record = state
            .collections
            .iter()
            .find(|c| c.info.url == collection.url)
            .ok_or_else(|| HostError::CollectionNotFound {
                url: collection.url.clone(),
            })?;
        let mut containers: Vec<ContainerInfo> = record
            .containers
            .iter()
            .map(|seed| Self::materialize(seed, &record.containers))
            .collect();
        containers.sort_by_key(|c| !c.is_root);
        Ok(containers)
    }

    fn open_container(&self, url: &str) -> Result<ContainerInfo> {
        let state = self.read_state();
        for record in &state.collections {
            if let Some(seed) = record.containers.iter().find(|s| s.url == url) {
                return Ok(Self::materialize(seed, &record.containers));
            }
        }
        Err(HostError::ContainerNotFound {
            url: url.to_string(),
        })
    }

    fn lookup_collection(&self, url: &str) -> Result<CollectionInfo> {
        let state = self.read_state();
        state
            .collections
            .iter()
            .filter(|c| url.starts_with(&c.info.url))
            .max_by_key(|c| c.info.url.len())
            .map(|c| c.info.clone())
            .ok_or_else(|| HostError::CollectionNotFound {
                url: url.to_string(),
            })
    }
}

impl HookRegistry for MemoryHost {
    fn add_registration(
        &self,
        container_url: &str,
        registration: &HookRegistration,
    ) -> Result<()> {
        let id = RegistrationId(self.next_registration.fetch_add(1, Ordering::SeqCst));
        let mut state = self.write_state();
        state
            .registrations
            .entry(container_url.to_string())
            .or_default()
            .push(InstalledHook {
                id,
                registration: registration.clone(),
            });
        debug!(container = container_url, %id, "hook registered");
        Ok(())
    }

    fn list_registrations(&self, container_url: &str) -> Result<Vec<InstalledHook>> {
        Ok(self
            .read_state()
            .registrations
            .get(container_url)
            .cloned()
            .unwrap_or_default())
    }

    fn remove_registration(&self, container_url: &str, id: RegistrationId) -> Result<()> {
        let mut state = self.write_state();
        let hooks = state
            .registrations
            .get_mut(container_url)
            .ok_or(HostError::RegistrationNotFound(id))?;
        let before = hooks.len();
        hooks.retain(|h| h.id != id);
        if hooks.len() == before {
            return Err(HostError::RegistrationNotFound(id));
        }
        debug!(container = container_url, %id, "hook removed");
        Ok(())
    }
}

#[derive(Serialize)]
struct CollectionManifest<'a> {
    kind: &'static str,
    url: &'a str,
    exported_at: String,
    containers: Vec<&'a str>,
}

#[derive(Serialize)]
struct ContainerManifest<'a> {
    kind: &'static str,
    job: &'a ExportJob,
    exported_at: String,
}

impl ExportEngine for MemoryHost {
    fn backup_collection(
        &self,
        collection: &CollectionInfo,
        destination: &Path,
        overwrite: bool,
    ) -> Result<()> {
        self.require_elevation(&collection.url, false)?;
        if let Some(reason) = self.injected_failure() {
            return Err(HostError::Backup {
                url: collection.url.clone(),
                reason,
            });
        }
        if destination.exists() && !overwrite {
            return Err(HostError::Backup {
                url: collection.url.clone(),
                reason: format!("{} already exists", destination.display()),
            });
        }

        let state = self.read_state();
        let record = state
            .collections
            .iter()
            .find(|c| c.info.url == collection.url)
            .ok_or_else(|| HostError::CollectionNotFound {
                url: collection.url.clone(),
            })?;
        let manifest = CollectionManifest {
            kind: "collection",
            url: &collection.url,
            exported_at: chrono::Utc::now().to_rfc3339(),
            containers: record.containers.iter().map(|s| s.url.as_str()).collect(),
        };
        write_manifest(destination, &manifest).map_err(|reason| HostError::Backup {
            url: collection.url.clone(),
            reason,
        })?;
        debug!(url = %collection.url, destination = %destination.display(), "collection backed up");
        Ok(())
    }

    fn run_export(&self, job: &ExportJob) -> Result<()> {
        self.require_elevation(&job.container_url, true)?;
        if let Some(reason) = self.injected_failure() {
            return Err(HostError::Export {
                url: job.container_url.clone(),
                reason,
            });
        }
        if !job.file_location.is_dir() {
            return Err(HostError::Export {
                url: job.container_url.clone(),
                reason: format!("target location {} does not exist", job.file_location.display()),
            });
        }

        let destination = job.file_location.join(&job.base_file_name);
        let manifest = ContainerManifest {
            kind: "container",
            job,
            exported_at: chrono::Utc::now().to_rfc3339(),
        };
        write_manifest(&destination, &manifest).map_err(|reason| HostError::Export {
            url: job.container_url.clone(),
            reason,
        })?;
        debug!(url = %job.container_url, destination = %destination.display(), "container exported");
        Ok(())
    }
}

fn write_manifest<T: Serialize>(destination: &Path, manifest: &T) -> std::result::Result<(), String> {
    let payload = serde_json::to_string_pretty(manifest).map_err(|e| e.to_string())?;
    fs::write(destination, payload).map_err(|e| e.to_string())
}

impl EventLog for MemoryHost {
    fn ensure_source(&self, source: &str) -> Result<()> {
        self.sources
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(source.to_string());
        Ok(())
    }

    fn error(&self, source: &str, event_id: u32, message: &str) -> Result<()> {
        let known = self
            .sources
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(source);
        if !known {
            return Err(HostError::EventLog(format!("source {source} not registered")));
        }
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(LoggedEvent {
                source: source.to_string(),
                event_id,
                message: message.to_string(),
            });
        Ok(())
    }
}

impl PrivilegeBroker for MemoryHost {
    fn elevate(&self) -> Result<()> {
        if self.elevated.swap(true, Ordering::SeqCst) {
            return Err(HostError::ElevationReentered);
        }
        Ok(())
    }

    fn restore(&self) {
        self.elevated.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elevation::ElevatedScope;
    use crate::events::HookEvent;

    fn finance_host() -> MemoryHost {
        let host = MemoryHost::new();
        host.add_collection("https://portal/sites/finance", "/sites/finance");
        host.add_container(
            "https://portal/sites/finance",
            "https://portal/sites/finance",
            "/sites/finance",
            "finance",
            true,
        )
        .unwrap();
        host.add_container(
            "https://portal/sites/finance",
            "https://portal/sites/finance/teamA",
            "/sites/finance/teamA",
            "teamA",
            false,
        )
        .unwrap();
        host
    }

    fn hook(sequence_number: i32) -> HookRegistration {
        HookRegistration {
            event: HookEvent::ContainerDeleting,
            class_name: "Receiver".into(),
            assembly_name: "recycle_receiver".into(),
            sequence_number,
        }
    }

    #[test]
    fn child_counts_are_computed_from_the_tree() {
        let host = finance_host();
        let root = host.open_container("https://portal/sites/finance").unwrap();
        assert!(root.is_root);
        assert_eq!(root.child_count, 1);

        let leaf = host
            .open_container("https://portal/sites/finance/teamA")
            .unwrap();
        assert!(!leaf.is_root);
        assert_eq!(leaf.child_count, 0);
    }

    #[test]
    fn containers_lists_root_first() {
        let host = finance_host();
        let collection = host.lookup_collection("https://portal/sites/finance").unwrap();
        let containers = host.containers(&collection).unwrap();
        assert_eq!(containers.len(), 2);
        assert!(containers[0].is_root);
    }

    #[test]
    fn lookup_collection_prefers_the_longest_prefix() {
        let host = finance_host();
        host.add_collection("https://portal", "/");
        let owner = host
            .lookup_collection("https://portal/sites/finance/teamA")
            .unwrap();
        assert_eq!(owner.url, "https://portal/sites/finance");
    }

    #[test]
    fn registrations_round_trip() {
        let host = finance_host();
        let url = "https://portal/sites/finance/teamA";
        host.add_registration(url, &hook(10001)).unwrap();
        host.add_registration(url, &hook(10001)).unwrap();

        let installed = host.list_registrations(url).unwrap();
        assert_eq!(installed.len(), 2);

        host.remove_registration(url, installed[0].id).unwrap();
        assert_eq!(host.list_registrations(url).unwrap().len(), 1);

        let missing = host.remove_registration(url, installed[0].id);
        assert!(matches!(missing, Err(HostError::RegistrationNotFound(_))));
    }

    #[test]
    fn exports_are_refused_outside_an_elevated_scope() {
        let host = finance_host();
        let dir = tempfile::tempdir().unwrap();
        let collection = host.lookup_collection("https://portal/sites/finance").unwrap();
        let err = host
            .backup_collection(&collection, &dir.path().join("finance.bak"), true)
            .unwrap_err();
        assert!(matches!(err, HostError::Backup { .. }));
    }

    #[test]
    fn collection_backup_writes_a_manifest() {
        let host = finance_host();
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("finance.bak");
        let collection = host.lookup_collection("https://portal/sites/finance").unwrap();

        let scope = ElevatedScope::acquire(&host).unwrap();
        host.backup_collection(&collection, &destination, true).unwrap();
        drop(scope);

        let payload = std::fs::read_to_string(&destination).unwrap();
        assert!(payload.contains("\"collection\""));
        assert!(payload.contains("teamA"));
    }

    #[test]
    fn run_export_requires_an_existing_target_location() {
        let host = finance_host();
        let dir = tempfile::tempdir().unwrap();
        let job = ExportJob {
            method: crate::types::ExportMethod::ExportAll,
            base_file_name: "teamA.bak".into(),
            file_location: dir.path().join("missing"),
            exclude_dependencies: false,
            include_security: crate::types::IncludeSecurity::All,
            container_url: "https://portal/sites/finance/teamA".into(),
            exclude_children: true,
        };
        let scope = ElevatedScope::acquire(&host).unwrap();
        let err = host.run_export(&job).unwrap_err();
        drop(scope);
        assert!(matches!(err, HostError::Export { .. }));
    }

    #[test]
    fn injected_faults_surface_as_export_failures() {
        let host = finance_host();
        let dir = tempfile::tempdir().unwrap();
        host.set_export_failure(Some("disk full"));
        let collection = host.lookup_collection("https://portal/sites/finance").unwrap();

        let scope = ElevatedScope::acquire(&host).unwrap();
        let err = host
            .backup_collection(&collection, &dir.path().join("finance.bak"), true)
            .unwrap_err();
        drop(scope);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn event_log_requires_a_registered_source() {
        let host = MemoryHost::new();
        let err = host.error("Site Recycle Bin", 1000, "boom").unwrap_err();
        assert!(matches!(err, HostError::EventLog(_)));

        host.ensure_source("Site Recycle Bin").unwrap();
        host.error("Site Recycle Bin", 1000, "boom").unwrap();
        assert_eq!(host.events().len(), 1);
        assert_eq!(host.events()[0].event_id, 1000);
    }
}
