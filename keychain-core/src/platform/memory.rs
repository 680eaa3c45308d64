//! In-memory secure storage.
//!
//! Provides no protection at all: payloads live in a plain `HashMap`. It
//! follows the same matching rules as the Keychain so that the store and the
//! profile flows can be exercised without a device, and it can simulate a
//! locked device and corrupted payloads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::access::AccessPolicy;

use super::error::{PlatformError, PlatformResult};
use super::traits::{SecureStorage, StoreQuery};

/// Primary key of an entry: `(service_name, unique_id)`.
type EntryKey = (String, String);

struct StoredItem {
    access_policy: AccessPolicy,
    payload: Vec<u8>,
}

/// `HashMap`-backed [`SecureStorage`].
#[derive(Default)]
pub struct InMemorySecureStorage {
    entries: Mutex<HashMap<EntryKey, StoredItem>>,
    locked: AtomicBool,
}

impl InMemorySecureStorage {
    /// Creates an empty, unlocked storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates locking or unlocking the device. While locked every request
    /// fails with [`PlatformError::AccessDenied`].
    pub fn set_locked(&self, locked: bool) {
        self.locked.store(locked, Ordering::SeqCst);
    }

    /// Writes `payload` verbatim, replacing whatever is stored under the
    /// query's primary key.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal mutex is poisoned.
    pub fn insert_raw(&self, query: &StoreQuery, payload: Vec<u8>) -> PlatformResult<()> {
        self.entries()?.insert(
            key_of(query),
            StoredItem {
                access_policy: query.access_policy,
                payload,
            },
        );
        Ok(())
    }

    /// Returns the raw payload stored under `(service_name, unique_id)`,
    /// ignoring access policy and lock state.
    #[must_use]
    pub fn raw_payload(&self, service_name: &str, unique_id: &str) -> Option<Vec<u8>> {
        let entries = self.entries().ok()?;
        entries
            .get(&(service_name.to_string(), unique_id.to_string()))
            .map(|item| item.payload.clone())
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().map_or(0, |entries| entries.len())
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> PlatformResult<MutexGuard<'_, HashMap<EntryKey, StoredItem>>> {
        self.entries
            .lock()
            .map_err(|_| PlatformError::Backend("mutex poisoned".to_string()))
    }

    fn ensure_unlocked(&self) -> PlatformResult<()> {
        if self.locked.load(Ordering::SeqCst) {
            return Err(PlatformError::AccessDenied);
        }
        Ok(())
    }
}

fn key_of(query: &StoreQuery) -> EntryKey {
    (query.service_name.clone(), query.unique_id.clone())
}

impl SecureStorage for InMemorySecureStorage {
    fn add(&self, query: StoreQuery, payload: Vec<u8>) -> PlatformResult<()> {
        self.ensure_unlocked()?;
        let mut entries = self.entries()?;
        let key = key_of(&query);
        if entries.contains_key(&key) {
            return Err(PlatformError::DuplicateItem);
        }
        entries.insert(
            key,
            StoredItem {
                access_policy: query.access_policy,
                payload,
            },
        );
        Ok(())
    }

    fn update(&self, query: StoreQuery, payload: Vec<u8>) -> PlatformResult<()> {
        self.ensure_unlocked()?;
        let mut entries = self.entries()?;
        match entries.get_mut(&key_of(&query)) {
            Some(item) if item.access_policy == query.access_policy => {
                item.payload = payload;
                Ok(())
            }
            _ => Err(PlatformError::ItemNotFound),
        }
    }

    fn copy_matching(&self, query: StoreQuery) -> PlatformResult<Option<Vec<u8>>> {
        self.ensure_unlocked()?;
        let entries = self.entries()?;
        Ok(entries
            .get(&key_of(&query))
            .filter(|item| item.access_policy == query.access_policy)
            .map(|item| item.payload.clone()))
    }

    fn delete(&self, query: StoreQuery) -> PlatformResult<()> {
        self.ensure_unlocked()?;
        let mut entries = self.entries()?;
        let key = key_of(&query);
        match entries.get(&key) {
            Some(item) if item.access_policy == query.access_policy => {
                entries.remove(&key);
                Ok(())
            }
            _ => Err(PlatformError::ItemNotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(id: &str, access_policy: AccessPolicy) -> StoreQuery {
        StoreQuery {
            service_name: "com.example.keychain".to_string(),
            unique_id: id.to_string(),
            access_policy,
        }
    }

    #[test]
    fn test_add_rejects_duplicate_across_policies() {
        let storage = InMemorySecureStorage::new();
        storage
            .add(query("a", AccessPolicy::WhenUnlocked), vec![1])
            .expect("add");

        let err = storage
            .add(query("a", AccessPolicy::WhenUnlockedThisDeviceOnly), vec![2])
            .expect_err("duplicate");
        assert_eq!(err, PlatformError::DuplicateItem);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_policy_is_a_match_attribute() {
        let storage = InMemorySecureStorage::new();
        storage
            .add(query("a", AccessPolicy::WhenUnlocked), vec![1])
            .expect("add");

        let other = query("a", AccessPolicy::WhenUnlockedThisDeviceOnly);
        assert_eq!(storage.copy_matching(other.clone()).expect("read"), None);
        assert_eq!(
            storage.update(other.clone(), vec![2]).expect_err("update"),
            PlatformError::ItemNotFound
        );
        assert_eq!(
            storage.delete(other).expect_err("delete"),
            PlatformError::ItemNotFound
        );
        assert_eq!(
            storage
                .copy_matching(query("a", AccessPolicy::WhenUnlocked))
                .expect("read"),
            Some(vec![1])
        );
    }

    #[test]
    fn test_update_and_delete_missing_entry() {
        let storage = InMemorySecureStorage::new();
        let q = query("missing", AccessPolicy::WhenUnlocked);
        assert_eq!(
            storage.update(q.clone(), vec![1]).expect_err("update"),
            PlatformError::ItemNotFound
        );
        assert_eq!(
            storage.delete(q).expect_err("delete"),
            PlatformError::ItemNotFound
        );
        assert!(storage.is_empty());
    }

    #[test]
    fn test_locked_device_denies_everything() {
        let storage = InMemorySecureStorage::new();
        let q = query("a", AccessPolicy::WhenUnlocked);
        storage.add(q.clone(), vec![1]).expect("add");
        storage.set_locked(true);

        assert_eq!(
            storage.copy_matching(q.clone()).expect_err("read"),
            PlatformError::AccessDenied
        );
        assert_eq!(
            storage.add(query("b", AccessPolicy::WhenUnlocked), vec![2]),
            Err(PlatformError::AccessDenied)
        );

        storage.set_locked(false);
        assert_eq!(storage.copy_matching(q).expect("read"), Some(vec![1]));
    }

    #[test]
    fn test_insert_raw_overwrites() {
        let storage = InMemorySecureStorage::new();
        let q = query("a", AccessPolicy::WhenUnlocked);
        storage.add(q.clone(), vec![1]).expect("add");
        storage.insert_raw(&q, vec![9, 9]).expect("insert");
        assert_eq!(
            storage.raw_payload("com.example.keychain", "a"),
            Some(vec![9, 9])
        );
    }
}
