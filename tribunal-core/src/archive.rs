// Session archive retrieval
// Records live as JSON documents in a flat archive directory

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, Context, Result};

use crate::types::SessionRecord;

/// Locates and loads recorded sessions from the archive directory
pub struct ArchiveStore {
    base_dir: PathBuf,
}

impl ArchiveStore {
    /// Archive directory from `$TRIBUNAL_ARCHIVE_DIR`, defaulting to
    /// `~/Archives/tribunal`
    pub fn new() -> Result<Self> {
        let base_dir = match std::env::var("TRIBUNAL_ARCHIVE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => {
                let home = std::env::var("HOME").context("HOME not set")?;
                PathBuf::from(home).join("Archives").join("tribunal")
            }
        };
        Ok(ArchiveStore { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        ArchiveStore { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Load and parse a record. `Ok(None)` means the file does not
    /// exist; read and parse failures are errors.
    pub fn load_record(&self, path: &Path) -> Result<Option<SessionRecord>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session record: {}", path.display()))?;
        let record: SessionRecord = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse session record: {}", path.display()))?;
        Ok(Some(record))
    }

    /// Newest `.json` record in the archive directory by mtime
    pub fn find_latest_record(&self) -> Result<PathBuf> {
        if !self.base_dir.exists() {
            return Err(eyre!(
                "Archive directory not found: {}",
                self.base_dir.display()
            ));
        }

        let mut latest: Option<(PathBuf, std::time::SystemTime)> = None;

        for entry in fs::read_dir(&self.base_dir)
            .with_context(|| format!("Failed to read archive directory: {}", self.base_dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                let modified = entry.metadata()?.modified()?;
                if latest.is_none() || modified > latest.as_ref().unwrap().1 {
                    latest = Some((path, modified));
                }
            }
        }

        latest
            .map(|(path, _)| path)
            .ok_or_else(|| eyre!("No session records found in {}", self.base_dir.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_record_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(
            &path,
            r#"{"actionLog": [{"player": "P1", "action": "vote", "round": 1, "phase": "day"}], "winner": "villagers"}"#,
        )
        .unwrap();

        let store = ArchiveStore::with_base_dir(dir.path().to_path_buf());
        let record = store.load_record(&path).unwrap().unwrap();
        assert_eq!(record.action_log.len(), 1);
        assert_eq!(record.winner.as_deref(), Some("villagers"));
    }

    #[test]
    fn test_missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::with_base_dir(dir.path().to_path_buf());
        let record = store.load_record(&dir.path().join("absent.json")).unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_malformed_record_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let store = ArchiveStore::with_base_dir(dir.path().to_path_buf());
        assert!(store.load_record(&path).is_err());
    }

    #[test]
    fn test_find_latest_record_prefers_newest() {
        let dir = tempfile::tempdir().unwrap();
        let older = dir.path().join("older.json");
        let newer = dir.path().join("newer.json");

        let mut f = fs::File::create(&older).unwrap();
        f.write_all(b"{}").unwrap();
        // ensure a strictly later mtime on the second file
        std::thread::sleep(std::time::Duration::from_millis(20));
        let mut f = fs::File::create(&newer).unwrap();
        f.write_all(b"{}").unwrap();

        let store = ArchiveStore::with_base_dir(dir.path().to_path_buf());
        assert_eq!(store.find_latest_record().unwrap(), newer);
    }

    #[test]
    fn test_find_latest_record_ignores_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let record = dir.path().join("only.json");
        fs::write(&record, "{}").unwrap();

        let store = ArchiveStore::with_base_dir(dir.path().to_path_buf());
        assert_eq!(store.find_latest_record().unwrap(), record);
    }

    #[test]
    fn test_find_latest_record_missing_dir_is_error() {
        let store = ArchiveStore::with_base_dir(PathBuf::from("/nonexistent/tribunal-archive"));
        assert!(store.find_latest_record().is_err());
    }

    #[test]
    fn test_find_latest_record_empty_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::with_base_dir(dir.path().to_path_buf());
        assert!(store.find_latest_record().is_err());
    }
}
