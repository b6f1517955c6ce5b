//! secrets::file_store
//!
//! File-backed secret storage: a flat TOML table of key/value pairs at
//! `~/.vaultsync/secrets.toml`.
//!
//! # Security
//!
//! - The file is created with mode 0600 on Unix, and the mode is applied
//!   before any secret byte is written
//! - Writes go to a temp sibling and are renamed into place, so a crash
//!   mid-write cannot leave a half-written secrets file
//! - Error messages name the failing step, never the stored values

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{SecretError, SecretStore};

/// The default secret store: one TOML file under the user's home.
#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Store at the default location, `~/.vaultsync/secrets.toml`.
    pub fn new() -> Result<Self, SecretError> {
        let home = dirs::home_dir()
            .ok_or_else(|| SecretError::ReadError("home directory is not set".into()))?;
        Ok(Self {
            path: home.join(".vaultsync").join("secrets.toml"),
        })
    }

    /// Store at an explicit path. Tests point this at a temp dir.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path to the secrets file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the whole table. A file that has never been written reads as
    /// an empty table; an unparsable one is an error.
    fn load(&self) -> Result<HashMap<String, String>, SecretError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(SecretError::ReadError(format!("secrets file: {}", e))),
        };

        toml::from_str(&content)
            .map_err(|e| SecretError::ReadError(format!("secrets file is not valid TOML: {}", e)))
    }

    /// Replace the whole table on disk, atomically and with restrictive
    /// permissions in place before content lands.
    fn persist(&self, table: &HashMap<String, String>) -> Result<(), SecretError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SecretError::WriteError(format!("secrets directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(table)
            .map_err(|e| SecretError::WriteError(format!("encoding secrets: {}", e)))?;

        let temp = self.path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp)
                .map_err(|e| SecretError::WriteError(format!("secrets temp file: {}", e)))?;

            // Lock the mode down before a single secret byte is written.
            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| SecretError::WriteError(format!("secrets file mode: {}", e)))?;

            file.write_all(content.as_bytes())
                .map_err(|e| SecretError::WriteError(format!("secrets temp file: {}", e)))?;
            file.sync_all()
                .map_err(|e| SecretError::WriteError(format!("secrets temp file: {}", e)))?;
        }

        fs::rename(&temp, &self.path)
            .map_err(|e| SecretError::WriteError(format!("replacing secrets file: {}", e)))
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let mut table = self.load()?;
        table.insert(key.to_string(), value.to_string());
        self.persist(&table)
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let mut table = self.load()?;
        table.remove(key);
        self.persist(&table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileSecretStore) {
        let temp = TempDir::new().expect("temp dir");
        let store = FileSecretStore::with_path(temp.path().join("secrets.toml"));
        (temp, store)
    }

    #[test]
    fn missing_key_reads_as_none() {
        let (_temp, s) = store();
        assert!(s.get("remote.auth").expect("get").is_none());
    }

    #[test]
    fn set_then_get_then_delete() {
        let (_temp, s) = store();

        s.set("remote.auth", "opaque-blob").expect("set");
        assert_eq!(
            s.get("remote.auth").expect("get").as_deref(),
            Some("opaque-blob")
        );

        s.delete("remote.auth").expect("delete");
        assert!(s.get("remote.auth").expect("get").is_none());
    }

    #[test]
    fn set_replaces_existing_value() {
        let (_temp, s) = store();
        s.set("key", "first").expect("set");
        s.set("key", "second").expect("set again");
        assert_eq!(s.get("key").expect("get").as_deref(), Some("second"));
    }

    #[test]
    fn delete_of_missing_key_is_ok() {
        let (_temp, s) = store();
        s.delete("never-stored").expect("delete");
    }

    #[test]
    fn parent_directories_are_created() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("deep").join("secrets.toml");
        let s = FileSecretStore::with_path(path.clone());

        s.set("key", "value").expect("set");
        assert!(path.exists());
    }

    #[test]
    fn unparsable_file_is_a_read_error() {
        let (temp, s) = store();
        fs::write(temp.path().join("secrets.toml"), "][ not toml").expect("corrupt");
        assert!(matches!(s.get("key"), Err(SecretError::ReadError(_))));
    }

    #[cfg(unix)]
    #[test]
    fn file_mode_is_owner_only() {
        let (_temp, s) = store();
        s.set("key", "value").expect("set");

        let mode = fs::metadata(s.path())
            .expect("metadata")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn survives_reopening() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("secrets.toml");

        FileSecretStore::with_path(path.clone())
            .set("key", "value")
            .expect("set");

        let reopened = FileSecretStore::with_path(path);
        assert_eq!(reopened.get("key").expect("get").as_deref(), Some("value"));
    }

    #[test]
    fn values_round_trip_verbatim() {
        let (_temp, s) = store();
        let awkward = "value with \"quotes\", = signs\nand newlines";
        s.set("key", awkward).expect("set");
        assert_eq!(s.get("key").expect("get").as_deref(), Some(awkward));
    }
}
