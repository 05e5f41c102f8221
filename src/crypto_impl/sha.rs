//! SHA-2 family hashing
//!
//! Thin bindings over the `sha2` crate; HMAC and HKDF come from the
//! [`crate::traits::Hash`] default methods.

use sha2::Digest;

use super::digest_hash;

digest_hash! {
    /// SHA-256 hasher implementation
    Sha256 => sha2::Sha256, "SHA256", block: 64, out: 32
}

digest_hash! {
    /// SHA-512 hasher implementation
    Sha512 => sha2::Sha512, "SHA512", block: 128, out: 64
}
