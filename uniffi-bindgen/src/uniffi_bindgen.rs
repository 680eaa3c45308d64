//! Generates the Swift and Kotlin bindings from the compiled `keychain` library.

fn main() {
    uniffi::uniffi_bindgen_main();
}
