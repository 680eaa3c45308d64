//! Errors reported by the host storage facilities.

use thiserror::Error;

/// Result type for platform callbacks.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Status codes surfaced by a [`SecureStorage`](super::SecureStorage) or
/// [`Preferences`](crate::preferences::Preferences) implementation.
///
/// These mirror the handful of statuses the store reacts to. Everything else a
/// backend can report is folded into [`PlatformError::Backend`].
#[derive(Debug, Clone, PartialEq, Eq, Error, uniffi::Error)]
pub enum PlatformError {
    /// An entry with the same service name and identifier already exists.
    #[error("duplicate item")]
    DuplicateItem,

    /// No entry matches the query.
    #[error("item not found")]
    ItemNotFound,

    /// The entry exists but cannot be accessed right now (e.g. device locked).
    #[error("access denied")]
    AccessDenied,

    /// Any other failure reported by the secure storage backend.
    #[error("secure storage backend error: {0}")]
    Backend(String),

    /// Failures reading or writing ordinary application preferences.
    #[error("preferences error: {0}")]
    Preferences(String),

    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for PlatformError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}
