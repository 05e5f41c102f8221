#![cfg_attr(not(feature = "std"), no_std)]
//! # Rustle 🍂
//!
//! `no_std` compatible, pure Rust implementation of the classical
//! [Noise framework](https://noiseprotocol.org/noise.html): authenticated,
//! forward-secret handshakes built from Diffie-Hellman key exchanges,
//! followed by symmetric AEAD transport encryption.
//!
//! From user perspective, everything in this crate is built around two types:
//!
//! * [`NoiseHandshake`] - The handshake state machine
//! * [`transportstate::TransportState`] - Transport encryption after a completed handshake
//!
//! Users pick a [`handshakepattern::HandshakePattern`] and the crypto
//! primitives they wish to use, instantiate the handshake state machine and
//! complete the handshake using the methods provided by the [`Handshaker`]
//! trait:
//!
//! * [`Handshaker::write_message`] - Write next handshake message
//! * [`Handshaker::read_message`]  - Read next handshake message
//! * [`Handshaker::is_finished`]   - Is the handshake ready?
//! * [`Handshaker::finalize`]      - Move to transport state
//!
//! Handshake messages are exchanged by the peers until the handshake is
//! completed. After completion, [`Handshaker::finalize`] is called and the
//! handshake state machine is consumed into a
//! [`transportstate::TransportState`] instance, which can be used to decrypt
//! and encrypt communication between the peers.
//!
//! ## Handshake Patterns
//!
//! All one-way and interactive patterns from the Noise specification are
//! available pre-made in the [`handshakepattern`] module. Patterns are plain
//! data, so custom patterns can be defined with
//! [`handshakepattern::HandshakePattern::new`].
//!
//! Any pattern can additionally be augmented with a 32-byte pre-shared key,
//! which is mixed into the chaining key before the first message and turns
//! every transmitted ephemeral into key material as well.
//!
//! ## Crypto Vendors
//!
//! Concrete implementations of the crypto algorithms are in the [`crypto`]
//! module and users can even use their own implementations using the
//! definitions in the [`traits`] module.
//!
//! ## Features
//!
//! To improve build times and produce more optimized binaries, Rustle can be
//! configured by enabling and disabling crate features. Below is a listing
//! of the available features:
//!
//! | Feature flag              | Description                               | Default   | Details                               |
//! | ---                       | ---                                       | ---       | ---                                   |
//! | `use-25519`               | Enable X25519 DH                          | yes       |                                       |
//! | `use-aes-gcm`             | Enable AES-GCM cipher                     | yes       |                                       |
//! | `use-chacha20poly1305`    | Enable ChaCha20-Poly1305 cipher           | yes       |                                       |
//! | `use-sha`                 | Enable SHA-256 and SHA-512 hashing        | yes       |                                       |
//! | `use-blake2`              | Enable BLAKE2 hashing                     | yes       |                                       |
//! | `default-rng`             | Enable [`getrandom`]-backed default RNG   | yes       |                                       |
//! | `std`                     | Enable standard library support           | no        | Currently only affects dependencies   |
//! | `alloc`                   | Enable allocator support                  | no        | Reserved for future use               |
//!
//! ## Example
//!
//! Simplified example with the most straightforward (and unsecure) handshake
//! pattern and no handshake payload data at all:
//!
//! ```ignore
//! use rustle::crypto::cipher::ChaChaPoly;
//! use rustle::crypto::dh::X25519;
//! use rustle::crypto::hash::Sha256;
//! use rustle::handshakepattern::noise_nn;
//! use rustle::traits::Handshaker;
//! use rustle::NoiseHandshake;
//!
//! fn main() {
//!     let mut rng_alice = rand::thread_rng();
//!
//!     // Instantiate initiator handshake
//!     let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
//!         noise_nn(),     // Handshake pattern
//!         &[],            // Prologue data
//!         true,           // Are we the initiator
//!         None,           // Local static keypair..
//!         None,           // ..and ephemeral
//!         None,           // Peer static public key..
//!         None,           // ..and ephemeral
//!         None,           // Pre-shared key
//!         &mut rng_alice, // RNG instance
//!     ).unwrap();
//!
//!     let mut buf_alice_send = [0u8; 4096];
//!     let mut buf_alice_receive = [0u8; 4096];
//!
//!     // Write handshake message and deliver to peer
//!     let n = alice.write_message(&[], &mut buf_alice_send).unwrap();
//!     my_send_function(&buf_alice_send[..n]);
//!
//!     // Receive handshake message and process it
//!     let n = my_receive_function(&mut buf_alice_receive);
//!     let _ = alice.read_message(&buf_alice_receive[..n], &mut []).unwrap();
//!
//!     assert!(alice.is_finished());
//!
//!     // Move to transport state
//!     let mut alice = alice.finalize().unwrap();
//!
//!     // All done! Use .send() and .receive() on the transport state to
//!     // communicate with the peer
//!     let n = alice.send(b"Hello from Alice", &mut buf_alice_send).unwrap();
//!     my_send_function(&buf_alice_send[..n]);
//! }
//! ```
#![allow(clippy::needless_doctest_main)]

// Not really used for now
#[cfg(feature = "alloc")]
extern crate alloc;

pub mod bytearray;
pub mod cipherstate;
pub mod constants;
mod crypto_impl;
pub mod error;
pub mod handshakepattern;
mod handshakestate;
mod symmetricstate;
pub mod traits;
pub mod transportstate;

pub use handshakestate::NoiseHandshake;
pub use traits::Handshaker;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Concrete crypto implementations
pub mod crypto {

    /// Supported DH algorithms
    pub mod dh {
        #[cfg(feature = "use-25519")]
        pub use crate::crypto_impl::x25519::X25519;
    }

    /// Supported cipher algorithms
    pub mod cipher {
        #[cfg(feature = "use-aes-gcm")]
        pub use crate::crypto_impl::aes::AesGcm;
        #[cfg(feature = "use-chacha20poly1305")]
        pub use crate::crypto_impl::chacha::ChaChaPoly;
    }

    /// Supported hash algorithms
    pub mod hash {
        #[cfg(feature = "use-blake2")]
        pub use crate::crypto_impl::blake2::{Blake2b, Blake2s};
        #[cfg(feature = "use-sha")]
        pub use crate::crypto_impl::sha::{Sha256, Sha512};
    }

    /// Default RNG
    pub mod rng {
        #[cfg(feature = "default-rng")]
        pub use crate::crypto_impl::random::DefaultRng;
    }
}

/// A zeroize-on-drop container for keys
#[derive(ZeroizeOnDrop)]
pub struct KeyPair<P: Zeroize, S: Zeroize> {
    pub public: P,
    pub secret: S,
}
