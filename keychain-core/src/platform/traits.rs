//! Platform interface for the host's secure credential storage.

use crate::access::AccessPolicy;

use super::error::PlatformResult;

/// Identifies one entry in the secure storage facility.
///
/// `service_name` and `unique_id` form the primary key of the entry. The
/// `access_policy` is attached on writes and used as an additional match
/// attribute on reads, updates and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Record)]
pub struct StoreQuery {
    /// Service namespace the entry lives under (usually the bundle identifier).
    pub service_name: String,
    /// Caller-supplied identifier of the entry.
    pub unique_id: String,
    /// Accessibility the entry is written with or matched against.
    pub access_policy: AccessPolicy,
}

/// Secure storage facility provided by the host operating system.
///
/// On iOS this is backed by Keychain Services generic-password items
/// (`kSecAttrService` = service name, `kSecAttrAccount`/`kSecAttrGeneric` =
/// unique id, `kSecAttrAccessible` = [`AccessPolicy::attribute`]). On Android
/// it is usually an encrypted preferences file keyed by the Android Keystore.
///
/// Implementations only need to report the statuses below faithfully; the
/// store built on top handles fallbacks and error folding.
#[uniffi::export(with_foreign)]
pub trait SecureStorage: Send + Sync {
    /// Inserts a new entry.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::DuplicateItem`](super::PlatformError::DuplicateItem)
    ///   if an entry with the same service name and id exists, whatever its
    ///   access policy.
    /// - Any other error if the facility rejects the write.
    fn add(&self, query: StoreQuery, payload: Vec<u8>) -> PlatformResult<()>;

    /// Replaces the payload of the entry matching `query`.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::ItemNotFound`](super::PlatformError::ItemNotFound)
    ///   if nothing matches.
    /// - Any other error if the facility rejects the write.
    fn update(&self, query: StoreQuery, payload: Vec<u8>) -> PlatformResult<()>;

    /// Returns the payload of the entry matching `query`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the facility refuses the read, for instance
    /// [`PlatformError::AccessDenied`](super::PlatformError::AccessDenied)
    /// while the device is locked.
    fn copy_matching(&self, query: StoreQuery) -> PlatformResult<Option<Vec<u8>>>;

    /// Removes the entry matching `query`.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::ItemNotFound`](super::PlatformError::ItemNotFound)
    ///   if nothing matches.
    /// - Any other error if the facility rejects the delete.
    fn delete(&self, query: StoreQuery) -> PlatformResult<()>;
}
