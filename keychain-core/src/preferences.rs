//! Ordinary (non-secure) application preferences.
//!
//! Only the id of the current account lives here; the account itself is in
//! secure storage.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::platform::{PlatformError, PlatformResult};

/// Preference key holding the id of the current account.
pub const CURRENT_ACCOUNT_KEY: &str = "currentUserID";

/// String key-value preferences provided by the host (`UserDefaults`,
/// `SharedPreferences`, ...).
#[uniffi::export(with_foreign)]
pub trait Preferences: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn string_for_key(&self, key: String) -> Option<String>;

    /// Stores `value` under `key`; `None` removes the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences cannot be persisted.
    fn set_string(&self, key: String, value: Option<String>) -> PlatformResult<()>;
}

/// Preferences kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryPreferences {
    /// Creates empty preferences.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Preferences for InMemoryPreferences {
    fn string_for_key(&self, key: String) -> Option<String> {
        self.values.lock().ok()?.get(&key).cloned()
    }

    fn set_string(&self, key: String, value: Option<String>) -> PlatformResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| PlatformError::Preferences("mutex poisoned".to_string()))?;
        match value {
            Some(value) => values.insert(key, value),
            None => values.remove(&key),
        };
        Ok(())
    }
}

/// Preferences persisted as a flat JSON object in a single file.
///
/// Writes go to a sibling temporary file which is synced and then renamed
/// over the target, so readers see either the old or the new content.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    /// Uses the JSON file at `path`. The file and its parent directory are
    /// created on first write.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> PlatformResult<BTreeMap<String, String>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new())
            }
            Err(err) => return Err(preferences_error("read", &self.path, &err)),
        };
        serde_json::from_str(&text).map_err(|err| preferences_error("parse", &self.path, &err))
    }

    fn store(&self, values: &BTreeMap<String, String>) -> PlatformResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| preferences_error("create directory for", &self.path, &err))?;
        }
        let bytes = serde_json::to_vec_pretty(values)
            .map_err(|err| preferences_error("serialize", &self.path, &err))?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path)
            .map_err(|err| preferences_error("create", &temp_path, &err))?;
        file.write_all(&bytes)
            .and_then(|()| file.sync_all())
            .map_err(|err| preferences_error("write", &temp_path, &err))?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .map_err(|err| preferences_error("replace", &self.path, &err))
    }
}

fn preferences_error(action: &str, path: &Path, err: &dyn std::fmt::Display) -> PlatformError {
    PlatformError::Preferences(format!("failed to {action} {}: {err}", path.display()))
}

impl Preferences for FilePreferences {
    fn string_for_key(&self, key: String) -> Option<String> {
        match self.load() {
            Ok(mut values) => values.remove(&key),
            Err(err) => {
                log::warn!("ignoring unreadable preferences: {err}");
                None
            }
        }
    }

    fn set_string(&self, key: String, value: Option<String>) -> PlatformResult<()> {
        let mut values = self.load()?;
        match value {
            Some(value) => values.insert(key, value),
            None => values.remove(&key),
        };
        self.store(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_set_and_clear() {
        let prefs = InMemoryPreferences::new();
        assert_eq!(prefs.string_for_key(CURRENT_ACCOUNT_KEY.to_string()), None);

        prefs
            .set_string(CURRENT_ACCOUNT_KEY.to_string(), Some("ID".to_string()))
            .expect("set");
        assert_eq!(
            prefs.string_for_key(CURRENT_ACCOUNT_KEY.to_string()),
            Some("ID".to_string())
        );

        prefs
            .set_string(CURRENT_ACCOUNT_KEY.to_string(), None)
            .expect("clear");
        assert_eq!(prefs.string_for_key(CURRENT_ACCOUNT_KEY.to_string()), None);
    }

    #[test]
    fn test_file_preferences_persist_across_handles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("preferences.json");

        let prefs = FilePreferences::new(&path);
        assert_eq!(prefs.string_for_key("missing".to_string()), None);
        prefs
            .set_string("theme".to_string(), Some("dark".to_string()))
            .expect("set");
        prefs
            .set_string(CURRENT_ACCOUNT_KEY.to_string(), Some("ID".to_string()))
            .expect("set");

        let reopened = FilePreferences::new(&path);
        assert_eq!(
            reopened.string_for_key(CURRENT_ACCOUNT_KEY.to_string()),
            Some("ID".to_string())
        );
        assert_eq!(
            reopened.string_for_key("theme".to_string()),
            Some("dark".to_string())
        );
        assert!(!path.with_extension("tmp").exists());

        reopened
            .set_string(CURRENT_ACCOUNT_KEY.to_string(), None)
            .expect("clear");
        assert_eq!(prefs.string_for_key(CURRENT_ACCOUNT_KEY.to_string()), None);
        assert_eq!(
            prefs.string_for_key("theme".to_string()),
            Some("dark".to_string())
        );
    }

    #[test]
    fn test_corrupt_file_reads_empty_but_refuses_writes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        fs::write(&path, b"not json").expect("write");

        let prefs = FilePreferences::new(&path);
        assert_eq!(prefs.string_for_key(CURRENT_ACCOUNT_KEY.to_string()), None);
        assert!(matches!(
            prefs.set_string(CURRENT_ACCOUNT_KEY.to_string(), Some("ID".to_string())),
            Err(PlatformError::Preferences(_))
        ));
        assert_eq!(fs::read(&path).expect("read"), b"not json".to_vec());
    }
}
