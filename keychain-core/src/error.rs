use thiserror::Error;

use crate::account::ValidationError;
use crate::platform::PlatformError;

/// Result type for store writes.
pub type KeychainResult<T, E = KeychainError> = std::result::Result<T, E>;

/// Result type for the profile flows.
pub type ProfileResult<T, E = ProfileError> = std::result::Result<T, E>;

/// Error raised by store writes.
///
/// The underlying facility's status codes are deliberately not exposed:
/// callers only learn that the value did not make it into secure storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, uniffi::Error)]
pub enum KeychainError {
    /// The value could not be serialized or the facility rejected the write.
    #[error("Unable to save object to keychain.")]
    SaveFailure,
}

/// Error outputs from the profile flows.
#[derive(Debug, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum ProfileError {
    /// The submitted form is not acceptable.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No account is remembered as the current one.
    #[error("no_current_account")]
    NoCurrentAccount,
    /// An account is already stored for this device.
    #[error("account_already_exists")]
    AccountAlreadyExists,
    /// The secure store rejected the write.
    #[error(transparent)]
    Store(#[from] KeychainError),
    /// The current account id could not be persisted.
    #[error(transparent)]
    Preferences(#[from] PlatformError),
}
