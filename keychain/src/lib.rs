//! Library that gets compiled into the Swift package and the Android AAR.
//!
//! All exported types live in `keychain-core`; this crate re-exports them and
//! their `UniFFI` scaffolding so that a single `keychain` library is shipped.

keychain_core::uniffi_reexport_scaffolding!();

pub use keychain_core::*;
