use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Trait for rule persistence (enables testing via mocking)
///
/// Stores never touch the filesystem directly; they are handed a storage
/// backend. Production code uses [`FileStorage`]; tests use
/// `MockRuleStorage` (via `mockall`).
#[cfg_attr(test, mockall::automock)]
pub trait RuleStorage {
    /// Reads the stored document, `None` if nothing has been saved yet
    ///
    /// # Errors
    /// Returns error if the document exists but cannot be read
    fn read(&self) -> io::Result<Option<String>>;

    /// Replaces the stored document with `contents`
    ///
    /// # Errors
    /// Returns error if the document cannot be written
    fn write(&self, contents: &str) -> io::Result<()>;
}

/// File-backed storage with atomic replacement
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_owned();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RuleStorage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes to a sibling temp file, then renames it over the target so a
    /// crash mid-write never leaves a truncated document behind
    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path)?;
        let written = file
            .write_all(contents.as_bytes())
            .and_then(|()| file.sync_all());

        // Drop file handle before rename
        drop(file);

        written
            .and_then(|()| fs::rename(&temp_path, &self.path))
            .inspect_err(|_| {
                let _ = fs::remove_file(&temp_path);
            })?;

        tracing::debug!(path = %self.path.display(), bytes = contents.len(), "document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("missing.json"));
        assert!(storage.read().unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("glossary.json"));

        storage.write("[]").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("[]"));

        storage.write("[1]").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("glossary.json"));
        storage.write("{}").unwrap();

        assert!(!dir.path().join("glossary.json.tmp").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_write_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // the target is a non-empty directory, so the rename cannot replace it
        let target = dir.path().join("glossary.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        let storage = FileStorage::new(&target);
        assert!(storage.write("[]").is_err());
        assert!(!dir.path().join("glossary.json.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("settings.json");
        let storage = FileStorage::new(&path);

        storage.write("{}").unwrap();
        assert!(path.exists());
        assert_eq!(storage.path(), path.as_path());
    }
}
