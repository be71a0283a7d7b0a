/*!
Configuration for the site recycle bin
*/

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Deployment-relative path of the settings document.
pub const SETTINGS_PATH: &str = "features/site-recycle-bin/Settings.toml";

/// Settings read from the deployment's TOML document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Base folder all backup artifacts and the audit log land under.
    pub backup_folder: PathBuf,
    /// Assembly identity stamped into hook registrations.
    pub assembly_name: String,
    /// Unique identity of this capability's hook registrations.
    pub sequence_number: i32,
}

impl Settings {
    /// Load settings from the given document.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load settings from the fixed deployment-relative path.
    pub fn load_default() -> Result<Self> {
        Self::load(Path::new(SETTINGS_PATH))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_a_complete_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Settings.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "backup_folder = \"/var/backups\"\nassembly_name = \"recycle_receiver\"\nsequence_number = 10001"
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.backup_folder, PathBuf::from("/var/backups"));
        assert_eq!(settings.assembly_name, "recycle_receiver");
        assert_eq!(settings.sequence_number, 10001);
    }

    #[test]
    fn missing_document_is_a_configuration_error() {
        let err = Settings::load(Path::new("/nonexistent/Settings.toml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn malformed_document_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Settings.toml");
        std::fs::write(&path, "backup_folder = 7").unwrap();
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
