//! Create, view, edit and delete flows for the single device account.
//!
//! The account lives in secure storage under its own id; which id is
//! "current" is remembered in ordinary preferences under
//! [`CURRENT_ACCOUNT_KEY`].

use std::sync::Arc;

use crate::access::AccessPolicy;
use crate::account::{Account, AccountForm};
use crate::error::{ProfileError, ProfileResult};
use crate::platform::SecureStorage;
use crate::preferences::{Preferences, CURRENT_ACCOUNT_KEY};
use crate::store::{KeychainStore, DEFAULT_SERVICE_NAME};

/// Entry point for the presentation layer.
#[derive(uniffi::Object)]
pub struct ProfileManager {
    storage: Arc<dyn SecureStorage>,
    preferences: Arc<dyn Preferences>,
    service_name: String,
    access_policy: AccessPolicy,
}

impl std::fmt::Debug for ProfileManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileManager")
            .field("service_name", &self.service_name)
            .field("access_policy", &self.access_policy)
            .finish_non_exhaustive()
    }
}

impl ProfileManager {
    fn store_for(&self, id: &str) -> KeychainStore<Account> {
        KeychainStore::with_service_name(self.storage.clone(), self.service_name.clone(), id)
    }

    fn remember(&self, id: Option<String>) -> ProfileResult<()> {
        self.preferences
            .set_string(CURRENT_ACCOUNT_KEY.to_string(), id)
            .map_err(ProfileError::from)
    }
}

#[uniffi::export]
impl ProfileManager {
    /// Creates a manager using [`DEFAULT_SERVICE_NAME`] and
    /// [`AccessPolicy::WhenUnlocked`].
    #[uniffi::constructor]
    #[must_use]
    pub fn new(storage: Arc<dyn SecureStorage>, preferences: Arc<dyn Preferences>) -> Self {
        Self::with_options(
            storage,
            preferences,
            DEFAULT_SERVICE_NAME.to_string(),
            AccessPolicy::default(),
        )
    }

    /// Creates a manager with an explicit service name and access policy.
    #[uniffi::constructor]
    #[must_use]
    pub fn with_options(
        storage: Arc<dyn SecureStorage>,
        preferences: Arc<dyn Preferences>,
        service_name: String,
        access_policy: AccessPolicy,
    ) -> Self {
        Self {
            storage,
            preferences,
            service_name,
            access_policy,
        }
    }

    /// Returns the id remembered as the current account, if any.
    #[must_use]
    pub fn current_account_id(&self) -> Option<String> {
        self.preferences
            .string_for_key(CURRENT_ACCOUNT_KEY.to_string())
    }

    /// Loads the current account. `None` if no id is remembered or the entry
    /// cannot be read.
    #[must_use]
    pub fn current_account(&self) -> Option<Account> {
        let id = self.current_account_id()?;
        self.store_for(&id).fetch(self.access_policy)
    }

    /// Validates `form`, stores a new account and makes it current.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::AccountAlreadyExists`] if the current account can
    ///   still be read.
    /// - [`ProfileError::Validation`] if the form is rejected.
    /// - [`ProfileError::Store`] if the account cannot be saved; preferences
    ///   are left untouched.
    /// - [`ProfileError::Preferences`] if the id cannot be remembered; the
    ///   saved entry is removed again.
    pub fn create_account(&self, form: AccountForm) -> ProfileResult<Account> {
        if self.current_account().is_some() {
            return Err(ProfileError::AccountAlreadyExists);
        }
        let account = form.into_account()?;
        let store = self.store_for(&account.id);
        store.save(&account, self.access_policy)?;
        if let Err(err) = self.remember(Some(account.id.clone())) {
            log::warn!("dropping account {}: {err}", account.id);
            store.delete(self.access_policy);
            return Err(err);
        }
        log::info!("created account {}", account.id);
        Ok(account)
    }

    /// Applies `form` to the current account and stores the result.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::NoCurrentAccount`] if there is no readable current
    ///   account.
    /// - [`ProfileError::Validation`] if the form is rejected.
    /// - [`ProfileError::Store`] if the update is rejected.
    pub fn edit_account(&self, form: AccountForm) -> ProfileResult<Account> {
        let current = self
            .current_account()
            .ok_or(ProfileError::NoCurrentAccount)?;
        let edited = current.apply_edits(form)?;
        self.store_for(&edited.id)
            .update(&edited, self.access_policy)?;
        log::info!("updated account {}", edited.id);
        Ok(edited)
    }

    /// Deletes the current account and forgets its id.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::NoCurrentAccount`] if no id is remembered.
    /// - [`ProfileError::Preferences`] if the id cannot be cleared.
    pub fn delete_account(&self) -> ProfileResult<()> {
        let id = self
            .current_account_id()
            .ok_or(ProfileError::NoCurrentAccount)?;
        self.store_for(&id).delete(self.access_policy);
        self.remember(None)?;
        log::info!("deleted account {id}");
        Ok(())
    }
}
