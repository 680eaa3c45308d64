//! Generic secure key-value store.
//!
//! A [`KeychainStore`] maps one caller-supplied identifier to one entry in the
//! host's secure storage. The value is serialized as JSON inside a single-key
//! object, `{"<id>-single-object": <value>}`, so that any serializable type
//! (including bare strings and numbers) produces a JSON object payload.
//!
//! ```
//! use std::sync::Arc;
//!
//! use keychain_core::{AccessPolicy, InMemorySecureStorage, KeychainStore};
//!
//! let storage = Arc::new(InMemorySecureStorage::new());
//! let store = KeychainStore::<Vec<u32>>::new(storage, "lucky-numbers");
//!
//! store.save(&vec![4, 8, 15], AccessPolicy::WhenUnlocked).unwrap();
//! assert_eq!(store.fetch(AccessPolicy::WhenUnlocked), Some(vec![4, 8, 15]));
//!
//! store.delete(AccessPolicy::WhenUnlocked);
//! assert_eq!(store.fetch(AccessPolicy::WhenUnlocked), None);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::access::AccessPolicy;
use crate::account::Account;
use crate::error::{KeychainError, KeychainResult};
use crate::platform::{PlatformError, SecureStorage, StoreQuery};

/// Service name used when the caller does not provide one.
pub const DEFAULT_SERVICE_NAME: &str = "DefaultService";

const SINGLE_OBJECT_SUFFIX: &str = "-single-object";

/// Secure storage entry holding a single value of type `T`.
pub struct KeychainStore<T> {
    service_name: String,
    unique_id: String,
    storage: Arc<dyn SecureStorage>,
    value: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for KeychainStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeychainStore")
            .field("service_name", &self.service_name)
            .field("unique_id", &self.unique_id)
            .finish_non_exhaustive()
    }
}

impl<T> KeychainStore<T> {
    /// Creates a store for `unique_id` under [`DEFAULT_SERVICE_NAME`].
    #[must_use]
    pub fn new(storage: Arc<dyn SecureStorage>, unique_id: impl Into<String>) -> Self {
        Self::with_service_name(storage, DEFAULT_SERVICE_NAME, unique_id)
    }

    /// Creates a store for `unique_id` under `service_name`.
    #[must_use]
    pub fn with_service_name(
        storage: Arc<dyn SecureStorage>,
        service_name: impl Into<String>,
        unique_id: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            unique_id: unique_id.into(),
            storage,
            value: PhantomData,
        }
    }

    /// Returns the service name entries are stored under.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the identifier of the entry.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Key of the value inside the serialized wrapper object.
    fn key(&self) -> String {
        format!("{}{SINGLE_OBJECT_SUFFIX}", self.unique_id)
    }

    fn query(&self, access_policy: AccessPolicy) -> StoreQuery {
        StoreQuery {
            service_name: self.service_name.clone(),
            unique_id: self.unique_id.clone(),
            access_policy,
        }
    }
}

impl<T: Serialize + DeserializeOwned> KeychainStore<T> {
    /// Stores `value`, creating the entry or overwriting an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainError::SaveFailure`] if the value cannot be
    /// serialized or the facility rejects the write. An entry that already
    /// exists with a different access policy cannot be overwritten and also
    /// yields this error.
    pub fn save(&self, value: &T, access_policy: AccessPolicy) -> KeychainResult<()> {
        let payload = self.encode(value)?;
        match self.storage.add(self.query(access_policy), payload) {
            Ok(()) => {
                log::debug!("created entry {}/{}", self.service_name, self.unique_id);
                Ok(())
            }
            Err(PlatformError::DuplicateItem) => self.update(value, access_policy),
            Err(err) => {
                log::warn!(
                    "failed to create entry {}/{}: {err}",
                    self.service_name,
                    self.unique_id
                );
                Err(KeychainError::SaveFailure)
            }
        }
    }

    /// Overwrites the payload of the existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainError::SaveFailure`] if the value cannot be
    /// serialized, if no entry matches, or if the facility rejects the write.
    pub fn update(&self, value: &T, access_policy: AccessPolicy) -> KeychainResult<()> {
        let payload = self.encode(value)?;
        self.storage
            .update(self.query(access_policy), payload)
            .map_err(|err| {
                log::warn!(
                    "failed to update entry {}/{}: {err}",
                    self.service_name,
                    self.unique_id
                );
                KeychainError::SaveFailure
            })?;
        log::debug!("updated entry {}/{}", self.service_name, self.unique_id);
        Ok(())
    }

    /// Reads the stored value.
    ///
    /// Returns `None` when the entry is absent, when access is denied and when
    /// the payload cannot be decoded into `T`; callers cannot tell these apart.
    #[must_use]
    pub fn fetch(&self, access_policy: AccessPolicy) -> Option<T> {
        let payload = match self.storage.copy_matching(self.query(access_policy)) {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(err) => {
                log::debug!(
                    "cannot read entry {}/{}: {err}",
                    self.service_name,
                    self.unique_id
                );
                return None;
            }
        };

        match serde_json::from_slice::<HashMap<String, T>>(&payload) {
            Ok(mut wrapper) => wrapper.remove(&self.key()),
            Err(err) => {
                log::warn!(
                    "discarding undecodable entry {}/{}: {err}",
                    self.service_name,
                    self.unique_id
                );
                None
            }
        }
    }

    /// Removes the entry. Missing entries and facility failures are ignored.
    pub fn delete(&self, access_policy: AccessPolicy) {
        match self.storage.delete(self.query(access_policy)) {
            Ok(()) => log::debug!("deleted entry {}/{}", self.service_name, self.unique_id),
            Err(PlatformError::ItemNotFound) => {}
            Err(err) => log::warn!(
                "failed to delete entry {}/{}: {err}",
                self.service_name,
                self.unique_id
            ),
        }
    }

    fn encode(&self, value: &T) -> KeychainResult<Vec<u8>> {
        let wrapper = BTreeMap::from([(self.key(), value)]);
        serde_json::to_vec(&wrapper).map_err(|err| {
            log::warn!(
                "failed to serialize entry {}/{}: {err}",
                self.service_name,
                self.unique_id
            );
            KeychainError::SaveFailure
        })
    }
}

/// [`KeychainStore`] specialized to [`Account`], for hosts that drive the four
/// store operations directly.
#[derive(Debug, uniffi::Object)]
pub struct AccountStore {
    inner: KeychainStore<Account>,
}

#[uniffi::export]
impl AccountStore {
    /// Creates a store for the account `unique_id` under [`DEFAULT_SERVICE_NAME`].
    #[uniffi::constructor]
    #[must_use]
    pub fn new(storage: Arc<dyn SecureStorage>, unique_id: String) -> Self {
        Self {
            inner: KeychainStore::new(storage, unique_id),
        }
    }

    /// Creates a store for the account `unique_id` under `service_name`.
    #[uniffi::constructor]
    #[must_use]
    pub fn with_service_name(
        storage: Arc<dyn SecureStorage>,
        service_name: String,
        unique_id: String,
    ) -> Self {
        Self {
            inner: KeychainStore::with_service_name(storage, service_name, unique_id),
        }
    }

    /// Stores `account`, falling back to an update if it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainError::SaveFailure`] if the write is rejected.
    pub fn save(&self, account: Account, access_policy: AccessPolicy) -> KeychainResult<()> {
        self.inner.save(&account, access_policy)
    }

    /// Overwrites the stored account.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainError::SaveFailure`] if there is nothing to update or
    /// the write is rejected.
    pub fn update(&self, account: Account, access_policy: AccessPolicy) -> KeychainResult<()> {
        self.inner.update(&account, access_policy)
    }

    /// Reads the stored account, if any.
    #[must_use]
    pub fn fetch(&self, access_policy: AccessPolicy) -> Option<Account> {
        self.inner.fetch(access_policy)
    }

    /// Removes the stored account, if any.
    pub fn delete(&self, access_policy: AccessPolicy) {
        self.inner.delete(access_policy);
    }
}
