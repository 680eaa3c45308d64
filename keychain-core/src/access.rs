//! Access policies controlling when a stored entry may be read.

use strum::{Display, EnumString};

/// Device-level unlock and sharing semantics attached to a stored entry.
///
/// The policy is sent with every request and acts as a match attribute: an
/// entry written with one policy is not visible to reads, updates or deletes
/// issued with the other.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum, EnumString, Display,
)]
#[strum(serialize_all = "kebab-case")]
pub enum AccessPolicy {
    /// Readable while the device is unlocked. Migrates to a new device through
    /// encrypted backups.
    #[default]
    WhenUnlocked,
    /// Readable while the device is unlocked. Never leaves this device, so it
    /// is excluded from device-to-device restore.
    WhenUnlockedThisDeviceOnly,
}

impl AccessPolicy {
    /// Every access policy, in declaration order.
    pub const ALL: [Self; 2] = [Self::WhenUnlocked, Self::WhenUnlockedThisDeviceOnly];

    /// Name of the accessibility attribute hosts should attach to the entry.
    #[must_use]
    pub const fn attribute(self) -> &'static str {
        match self {
            Self::WhenUnlocked => "kSecAttrAccessibleWhenUnlocked",
            Self::WhenUnlockedThisDeviceOnly => "kSecAttrAccessibleWhenUnlockedThisDeviceOnly",
        }
    }

    /// Whether entries with this policy are left out of device-to-device restore.
    #[must_use]
    pub const fn excluded_from_restore(self) -> bool {
        matches!(self, Self::WhenUnlockedThisDeviceOnly)
    }
}

/// Accessibility attribute name for `policy`.
#[uniffi::export]
#[must_use]
pub fn access_policy_attribute(policy: AccessPolicy) -> String {
    policy.attribute().to_string()
}
