//! BLAKE2 hashing
//!
//! Thin bindings over the `blake2` crate; only the fixed-output
//! variants are exposed since Noise has no use for keyed or
//! variable-length BLAKE2.

use blake2::Digest;

use super::digest_hash;

digest_hash! {
    /// BLAKE2b hash implementation
    Blake2b => blake2::Blake2b512, "BLAKE2b", block: 128, out: 64
}

digest_hash! {
    /// BLAKE2s hash implementation
    Blake2s => blake2::Blake2s256, "BLAKE2s", block: 64, out: 32
}
