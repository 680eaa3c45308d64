//! Platform abstraction for secure credential storage.
//!
//! The store never talks to an OS API directly. Each platform provides a
//! [`SecureStorage`] implementation:
//!
//! - iOS (Swift): Keychain Services generic-password items
//! - Android (Kotlin): Keystore-backed encrypted storage
//! - Desktop: [`KeyringSecureStorage`] over the OS credential store (feature `keyring`)
//! - Tests: [`InMemorySecureStorage`]

mod error;
pub mod memory;
mod traits;

#[cfg(feature = "keyring")]
mod keyring_store;

pub use error::{PlatformError, PlatformResult};
pub use memory::InMemorySecureStorage;
pub use traits::{SecureStorage, StoreQuery};

#[cfg(feature = "keyring")]
pub use keyring_store::KeyringSecureStorage;
