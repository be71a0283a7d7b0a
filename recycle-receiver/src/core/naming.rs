/*!
Destination naming for backup artifacts
*/

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::error::Result;

/// Extension shared by every backup artifact.
pub const BACKUP_EXTENSION: &str = ".bak";

/// Subfolder collecting whole-collection backups.
pub const COLLECTIONS_SUBFOLDER: &str = "Sites";

/// A resolved, collision-free destination. Recomputed for every invocation;
/// never cached across containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupDestination {
    /// Directory the artifact lands in. Guaranteed to exist on return.
    pub directory: PathBuf,
    /// Artifact file name, extension included.
    pub file_name: String,
}

impl BackupDestination {
    pub fn full_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Destination for a Tier A collection backup.
///
/// The stem is the server-relative path with its leading separator stripped;
/// interior separators become path components under the `Sites` subfolder,
/// so `/sites/finance` resolves to `<base>/Sites/sites/finance.bak`.
pub fn collection_destination(
    backup_folder: &Path,
    server_relative_path: &str,
) -> Result<BackupDestination> {
    let mut segments: Vec<&str> = server_relative_path
        .trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let Some(stem) = segments.pop() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("empty server-relative path: {server_relative_path:?}"),
        )
        .into());
    };
    let mut directory = backup_folder.join(COLLECTIONS_SUBFOLDER);
    for segment in segments {
        directory.push(segment);
    }
    resolve(directory, stem)
}

/// Destination for a Tier B container export.
///
/// The stem is the container's leaf name; the subfolder is the parent path
/// segment between the first and last separators of the server-relative
/// path, separators translated to the destination filesystem.
pub fn container_destination(
    backup_folder: &Path,
    server_relative_path: &str,
    name: &str,
) -> Result<BackupDestination> {
    let mut directory = backup_folder.to_path_buf();
    for segment in parent_segment(server_relative_path)
        .split('/')
        .filter(|s| !s.is_empty())
    {
        directory.push(segment);
    }
    resolve(directory, name)
}

/// The slice between the first and last separators, so
/// `/sites/finance/teamA` yields `/sites/finance` and a top-level `/teamA`
/// yields nothing.
fn parent_segment(server_relative_path: &str) -> &str {
    match (
        server_relative_path.find('/'),
        server_relative_path.rfind('/'),
    ) {
        (Some(first), Some(last)) if last > first => &server_relative_path[first..last],
        _ => "",
    }
}

/// Create the destination directory and pick a collision-free file name.
///
/// The exists-check runs once, immediately before the caller writes; the
/// disambiguated name is not re-verified. Best effort under concurrency, by
/// contract an admin-frequency operation.
fn resolve(directory: PathBuf, stem: &str) -> Result<BackupDestination> {
    fs::create_dir_all(&directory)?;
    let mut file_name = format!("{stem}{BACKUP_EXTENSION}");
    if directory.join(&file_name).exists() {
        let stamp = Local::now().format("(%Y-%m-%d-%H-%M-%S-%3f)");
        file_name = format!("{stem}{stamp}{BACKUP_EXTENSION}");
        debug!(%stem, disambiguated = %file_name, "destination collision");
    }
    debug!(directory = %directory.display(), file = %file_name, "destination resolved");
    Ok(BackupDestination {
        directory,
        file_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_stem_keeps_interior_separators_as_components() {
        let base = tempfile::tempdir().unwrap();
        let destination = collection_destination(base.path(), "/sites/finance").unwrap();
        assert_eq!(
            destination.directory,
            base.path().join("Sites").join("sites")
        );
        assert_eq!(destination.file_name, "finance.bak");
        assert!(destination.directory.is_dir());
    }

    #[test]
    fn container_parent_path_becomes_the_subfolder() {
        let base = tempfile::tempdir().unwrap();
        let destination =
            container_destination(base.path(), "/sites/finance/teamA", "teamA").unwrap();
        assert_eq!(
            destination.directory,
            base.path().join("sites").join("finance")
        );
        assert_eq!(destination.file_name, "teamA.bak");
    }

    #[test]
    fn top_level_container_lands_in_the_base_folder() {
        let base = tempfile::tempdir().unwrap();
        let destination = container_destination(base.path(), "/teamA", "teamA").unwrap();
        assert_eq!(destination.directory, base.path());
    }

    #[test]
    fn existing_file_gets_a_disambiguated_stem() {
        let base = tempfile::tempdir().unwrap();
        let first = container_destination(base.path(), "/sites/finance/teamA", "teamA").unwrap();
        std::fs::write(first.full_path(), b"taken").unwrap();

        let second = container_destination(base.path(), "/sites/finance/teamA", "teamA").unwrap();
        assert_ne!(second.file_name, first.file_name);
        assert!(second.file_name.starts_with("teamA("));
        assert!(second.file_name.ends_with(format!("){BACKUP_EXTENSION}").as_str()));
    }

    #[test]
    fn empty_collection_path_is_rejected() {
        let base = tempfile::tempdir().unwrap();
        assert!(collection_destination(base.path(), "/").is_err());
    }
}
