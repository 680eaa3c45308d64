#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

//! Secure storage for a single on-device account profile.
//!
//! - [`KeychainStore`] is a generic store mapping an identifier and any
//!   serializable type to one entry in the host's secure credential storage.
//! - [`ProfileManager`] implements the create / view / edit / delete flows of
//!   the account screen on top of it, remembering the current account id in
//!   ordinary [`Preferences`].
//!
//! The host platform supplies the storage facilities through the
//! [`SecureStorage`] and [`Preferences`] traits, which can be implemented in
//! Swift or Kotlin through the generated bindings.

pub mod access;
pub use access::AccessPolicy;

pub mod account;
pub use account::{Account, AccountForm, ValidationError};

mod error;
pub use error::*;

pub mod logger;

pub mod platform;
pub use platform::{InMemorySecureStorage, PlatformError, PlatformResult, SecureStorage, StoreQuery};

#[cfg(feature = "keyring")]
pub use platform::KeyringSecureStorage;

pub mod preferences;
pub use preferences::{FilePreferences, InMemoryPreferences, Preferences, CURRENT_ACCOUNT_KEY};

pub mod profile;
pub use profile::ProfileManager;

pub mod store;
pub use store::{AccountStore, KeychainStore, DEFAULT_SERVICE_NAME};

uniffi::setup_scaffolding!("keychain_core");
