//! Desktop secure storage backed by the OS credential store.
//!
//! Uses the `keyring` crate: Keychain on macOS, Credential Manager on
//! Windows and the kernel keyutils session keyring on Linux. None of these
//! know about mobile accessibility classes, so the access policy is kept as a
//! one-byte tag in front of the payload and matched on every request.

use keyring::{Entry, Error as KeyringError};

use crate::access::AccessPolicy;

use super::error::{PlatformError, PlatformResult};
use super::traits::{SecureStorage, StoreQuery};

const TAG_WHEN_UNLOCKED: u8 = 0x01;
const TAG_THIS_DEVICE_ONLY: u8 = 0x02;

/// [`SecureStorage`] over the platform credential store.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringSecureStorage;

impl KeyringSecureStorage {
    /// Creates a handle to the platform credential store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn entry(query: &StoreQuery) -> PlatformResult<Entry> {
        Entry::new(&query.service_name, &query.unique_id).map_err(map_keyring_error)
    }

    fn read(entry: &Entry, access_policy: AccessPolicy) -> PlatformResult<Existing> {
        match entry.get_secret() {
            Ok(secret) => Ok(Existing::classify(Some(secret.as_slice()), access_policy)),
            Err(KeyringError::NoEntry) => Ok(Existing::Absent),
            Err(err) => Err(map_keyring_error(err)),
        }
    }
}

/// How the credential under a `(service, id)` pair relates to a request.
#[derive(Debug, PartialEq, Eq)]
enum Existing {
    Absent,
    Matching(Vec<u8>),
    OtherPolicy,
    /// Written without a recognizable policy tag. Counts as existing for
    /// `add` and as a match for `update` and `delete`, so it can always be
    /// replaced or removed.
    Unreadable(PlatformError),
}

impl Existing {
    fn classify(secret: Option<&[u8]>, access_policy: AccessPolicy) -> Self {
        match secret.map(untag) {
            None => Self::Absent,
            Some(Ok((policy, payload))) if policy == access_policy => Self::Matching(payload),
            Some(Ok(_)) => Self::OtherPolicy,
            Some(Err(err)) => Self::Unreadable(err),
        }
    }

    /// `add` only writes where nothing exists, whatever its policy.
    const fn check_add(&self) -> PlatformResult<()> {
        match self {
            Self::Absent => Ok(()),
            _ => Err(PlatformError::DuplicateItem),
        }
    }

    /// `update` and `delete` act on matching or unreadable credentials.
    const fn check_replace(&self) -> PlatformResult<()> {
        match self {
            Self::Matching(_) | Self::Unreadable(_) => Ok(()),
            Self::Absent | Self::OtherPolicy => Err(PlatformError::ItemNotFound),
        }
    }

    fn into_payload(self) -> PlatformResult<Option<Vec<u8>>> {
        match self {
            Self::Matching(payload) => Ok(Some(payload)),
            Self::Absent | Self::OtherPolicy => Ok(None),
            Self::Unreadable(err) => Err(err),
        }
    }
}

fn map_keyring_error(err: KeyringError) -> PlatformError {
    match err {
        KeyringError::NoEntry => PlatformError::ItemNotFound,
        KeyringError::NoStorageAccess(_) => PlatformError::AccessDenied,
        other => PlatformError::Backend(other.to_string()),
    }
}

const fn policy_tag(policy: AccessPolicy) -> u8 {
    match policy {
        AccessPolicy::WhenUnlocked => TAG_WHEN_UNLOCKED,
        AccessPolicy::WhenUnlockedThisDeviceOnly => TAG_THIS_DEVICE_ONLY,
    }
}

fn tag(policy: AccessPolicy, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(policy_tag(policy));
    out.extend_from_slice(payload);
    out
}

fn untag(secret: &[u8]) -> PlatformResult<(AccessPolicy, Vec<u8>)> {
    let Some((&byte, payload)) = secret.split_first() else {
        return Err(PlatformError::Backend("empty credential".to_string()));
    };
    let policy = match byte {
        TAG_WHEN_UNLOCKED => AccessPolicy::WhenUnlocked,
        TAG_THIS_DEVICE_ONLY => AccessPolicy::WhenUnlockedThisDeviceOnly,
        other => {
            return Err(PlatformError::Backend(format!(
                "unrecognized access policy tag {other:#04x}"
            )))
        }
    };
    Ok((policy, payload.to_vec()))
}

impl SecureStorage for KeyringSecureStorage {
    fn add(&self, query: StoreQuery, payload: Vec<u8>) -> PlatformResult<()> {
        let entry = Self::entry(&query)?;
        Self::read(&entry, query.access_policy)?.check_add()?;
        entry
            .set_secret(&tag(query.access_policy, &payload))
            .map_err(map_keyring_error)
    }

    fn update(&self, query: StoreQuery, payload: Vec<u8>) -> PlatformResult<()> {
        let entry = Self::entry(&query)?;
        Self::read(&entry, query.access_policy)?.check_replace()?;
        entry
            .set_secret(&tag(query.access_policy, &payload))
            .map_err(map_keyring_error)
    }

    fn copy_matching(&self, query: StoreQuery) -> PlatformResult<Option<Vec<u8>>> {
        let entry = Self::entry(&query)?;
        Self::read(&entry, query.access_policy)?.into_payload()
    }

    fn delete(&self, query: StoreQuery) -> PlatformResult<()> {
        let entry = Self::entry(&query)?;
        Self::read(&entry, query.access_policy)?.check_replace()?;
        entry.delete_credential().map_err(map_keyring_error)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    const UNLOCKED: AccessPolicy = AccessPolicy::WhenUnlocked;
    const DEVICE_ONLY: AccessPolicy = AccessPolicy::WhenUnlockedThisDeviceOnly;

    #[test]
    fn test_tag_prefixes_payload() {
        let tagged = tag(DEVICE_ONLY, b"{}");
        assert_eq!(tagged, vec![TAG_THIS_DEVICE_ONLY, b'{', b'}']);
        let (policy, payload) = untag(&tagged).expect("untag");
        assert_eq!(policy, DEVICE_ONLY);
        assert_eq!(payload, b"{}".to_vec());
    }

    #[test]
    fn test_untag_rejects_unknown_or_empty() {
        assert!(matches!(untag(&[]), Err(PlatformError::Backend(_))));
        assert!(matches!(untag(&[0x7f, 1, 2]), Err(PlatformError::Backend(_))));
    }

    #[test]
    fn test_missing_entry_maps_to_item_not_found() {
        assert_eq!(
            map_keyring_error(KeyringError::NoEntry),
            PlatformError::ItemNotFound
        );
    }

    #[test_case(None, UNLOCKED => Ok(()) ; "nothing stored")]
    #[test_case(Some(tag(UNLOCKED, b"{}")), UNLOCKED => Err(PlatformError::DuplicateItem) ; "same policy")]
    #[test_case(Some(tag(DEVICE_ONLY, b"{}")), UNLOCKED => Err(PlatformError::DuplicateItem) ; "other policy")]
    #[test_case(Some(b"{\"x\":1}".to_vec()), UNLOCKED => Err(PlatformError::DuplicateItem) ; "untagged")]
    #[test_case(Some(Vec::new()), DEVICE_ONLY => Err(PlatformError::DuplicateItem) ; "empty secret")]
    fn test_add_refuses_any_existing_credential(
        secret: Option<Vec<u8>>,
        policy: AccessPolicy,
    ) -> PlatformResult<()> {
        Existing::classify(secret.as_deref(), policy).check_add()
    }

    #[test_case(None, UNLOCKED => Err(PlatformError::ItemNotFound) ; "nothing stored")]
    #[test_case(Some(tag(UNLOCKED, b"{}")), UNLOCKED => Ok(()) ; "same policy")]
    #[test_case(Some(tag(DEVICE_ONLY, b"{}")), UNLOCKED => Err(PlatformError::ItemNotFound) ; "other policy")]
    #[test_case(Some(b"{\"x\":1}".to_vec()), DEVICE_ONLY => Ok(()) ; "untagged")]
    #[test_case(Some(Vec::new()), UNLOCKED => Ok(()) ; "empty secret")]
    fn test_update_and_delete_match_on_policy(
        secret: Option<Vec<u8>>,
        policy: AccessPolicy,
    ) -> PlatformResult<()> {
        Existing::classify(secret.as_deref(), policy).check_replace()
    }

    #[test_case(None, UNLOCKED => Ok(None) ; "nothing stored")]
    #[test_case(Some(tag(UNLOCKED, b"{}")), UNLOCKED => Ok(Some(b"{}".to_vec())) ; "same policy")]
    #[test_case(Some(tag(UNLOCKED, b"{}")), DEVICE_ONLY => Ok(None) ; "other policy")]
    fn test_copy_matching_filters_on_policy(
        secret: Option<Vec<u8>>,
        policy: AccessPolicy,
    ) -> PlatformResult<Option<Vec<u8>>> {
        Existing::classify(secret.as_deref(), policy).into_payload()
    }

    #[test]
    fn test_untagged_credential_reads_as_backend_failure() {
        let existing = Existing::classify(Some(b"{\"x\":1}".as_slice()), UNLOCKED);
        assert_eq!(
            existing,
            Existing::Unreadable(PlatformError::Backend(
                "unrecognized access policy tag 0x7b".to_string()
            ))
        );
        assert!(matches!(
            existing.into_payload(),
            Err(PlatformError::Backend(_))
        ));
    }
}
