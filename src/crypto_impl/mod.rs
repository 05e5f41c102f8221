//! Concrete implementations of crypto primitives
//!
//! The vendor modules only bind a third-party implementation to this
//! crate's traits. Layout shared between vendors lives in `aead_common`
//! and the `digest_hash` macro below.

// Hashes
#[cfg(feature = "use-blake2")]
pub mod blake2;
#[cfg(feature = "use-sha")]
pub mod sha;

// Ciphers
#[cfg(any(feature = "use-aes-gcm", feature = "use-chacha20poly1305"))]
mod aead_common;
#[cfg(feature = "use-aes-gcm")]
pub mod aes;
#[cfg(feature = "use-chacha20poly1305")]
pub mod chacha;

// DHs
#[cfg(feature = "use-25519")]
pub mod x25519;

// RNG
#[cfg(feature = "default-rng")]
pub mod random;

/// Bind a [RustCrypto](https://github.com/RustCrypto) digest to the
/// [`crate::traits::Hash`] contract
///
/// The caller brings the vendor's `Digest` trait into scope; block and
/// output sizes cannot be read off the digest type without extra trait
/// machinery, so they are stated explicitly.
#[cfg(any(feature = "use-sha", feature = "use-blake2"))]
macro_rules! digest_hash {
    ($(#[$doc:meta])* $name:ident => $inner:ty, $proto:literal, block: $block:literal, out: $out:literal) => {
        $(#[$doc])*
        #[derive(Default)]
        pub struct $name($inner);

        impl $crate::traits::CryptoComponent for $name {
            fn name() -> &'static str {
                $proto
            }
        }

        impl $crate::traits::Hash for $name {
            type Block = [u8; $block];
            type Output = [u8; $out];

            fn input(&mut self, data: &[u8]) {
                self.0.update(data);
            }

            fn result(self) -> Self::Output {
                self.0.finalize().into()
            }
        }
    };
}
#[cfg(any(feature = "use-sha", feature = "use-blake2"))]
pub(crate) use digest_hash;
