/*!
Append-only audit log for backup attempts
*/

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use fs2::FileExt;

use crate::core::config::Settings;
use crate::error::{Error, Result};

/// Subfolder of the backup folder holding the audit log.
pub const LOG_SUBFOLDER: &str = "Log";

/// File name of the audit log.
pub const LOG_FILE_NAME: &str = "RecycleBin.log";

/// Append-only audit sink at `<backup_folder>/Log/RecycleBin.log`.
///
/// The destination is resolved once at construction. Each append holds the
/// sink's own mutex for the critical section (open, lock, append, flush,
/// close); the open handle additionally takes an exclusive advisory lock so
/// the log stays line-atomic even when other processes share it. Existing
/// content is never rewritten or truncated.
pub struct AuditSink {
    log_dir: PathBuf,
    lock: Mutex<()>,
}

impl AuditSink {
    pub fn new(settings: &Settings) -> Self {
        Self {
            log_dir: settings.backup_folder.join(LOG_SUBFOLDER),
            lock: Mutex::new(()),
        }
    }

    /// Full path of the log file.
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }

    /// Append one timestamped line: `(yyyy:MM:dd hh:mm:ss.mmm): <message>`.
    ///
    /// The log directory is created on first write.
    pub fn append(&self, message: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        fs::create_dir_all(&self.log_dir).map_err(|e| classify(e, &self.log_dir))?;
        let path = self.log_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| classify(e, &path))?;
        FileExt::lock_exclusive(&file).map_err(|e| classify(e, &path))?;

        let stamp = Local::now().format("(%Y:%m:%d %H:%M:%S%.3f):");
        write!(file, "{stamp} {message}\r\n").map_err(|e| classify(e, &path))?;
        file.flush().map_err(|e| classify(e, &path))?;
        // The advisory lock is released when the handle closes.
        Ok(())
    }
}

/// Permission denials are the security class and carry the refused path;
/// everything else is a plain filesystem failure.
fn classify(source: io::Error, path: &Path) -> Error {
    if source.kind() == io::ErrorKind::PermissionDenied {
        Error::Security {
            path: path.to_path_buf(),
            source,
        }
    } else {
        Error::Io(source)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn sink_in(dir: &Path) -> AuditSink {
        let settings = Settings {
            backup_folder: dir.to_path_buf(),
            assembly_name: "recycle_receiver".into(),
            sequence_number: 10001,
        };
        AuditSink::new(&settings)
    }

    #[test]
    fn creates_the_log_directory_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let sink = sink_in(dir.path());
        sink.append("first entry").unwrap();
        assert!(dir.path().join(LOG_SUBFOLDER).is_dir());
        assert!(sink.log_path().is_file());
    }

    #[test]
    fn lines_carry_a_millisecond_timestamp_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let sink = sink_in(dir.path());
        sink.append("entering delete").unwrap();

        let content = std::fs::read_to_string(sink.log_path()).unwrap();
        let line = content.lines().next().unwrap();
        let close = line.find("): ").unwrap();
        assert!(line.starts_with('('));
        NaiveDateTime::parse_from_str(&line[1..close], "%Y:%m:%d %H:%M:%S%.3f").unwrap();
        assert!(line.ends_with("entering delete"));
        assert!(content.ends_with("\r\n"));
    }

    #[test]
    fn appends_never_rewrite_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = sink_in(dir.path());
        sink.append("one").unwrap();
        sink.append("two").unwrap();

        let content = std::fs::read_to_string(sink.log_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("one"));
        assert!(lines[1].ends_with("two"));
    }
}
