use core::ops::Deref;

use chacha20poly1305::{ChaCha20Poly1305, KeyInit};

use super::aead_common;
use crate::bytearray::SensitiveByteArray;
use crate::error::CipherResult;
use crate::traits::{Cipher, CryptoComponent};

/// ChaCha20-Poly1305 cipher implementation
///
/// The IETF variant places the counter in the nonce in little-endian.
pub struct ChaChaPoly;

impl ChaChaPoly {
    fn aead(k: &<Self as Cipher>::Key) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(k.deref().into())
    }
}

impl CryptoComponent for ChaChaPoly {
    fn name() -> &'static str {
        "ChaChaPoly"
    }
}

impl Cipher for ChaChaPoly {
    type Key = SensitiveByteArray<[u8; 32]>;

    fn tag_len() -> usize {
        16
    }

    fn encrypt(k: &Self::Key, nonce: u64, ad: &[u8], plaintext: &[u8], out: &mut [u8]) {
        aead_common::encrypt(
            &Self::aead(k),
            &aead_common::le_nonce(nonce),
            ad,
            plaintext,
            out,
        );
    }

    fn encrypt_in_place(
        k: &Self::Key,
        nonce: u64,
        ad: &[u8],
        in_out: &mut [u8],
        plaintext_len: usize,
    ) -> usize {
        aead_common::encrypt_in_place(
            &Self::aead(k),
            &aead_common::le_nonce(nonce),
            ad,
            in_out,
            plaintext_len,
        )
    }

    fn decrypt(
        k: &Self::Key,
        nonce: u64,
        ad: &[u8],
        ciphertext: &[u8],
        out: &mut [u8],
    ) -> CipherResult<()> {
        aead_common::decrypt(
            &Self::aead(k),
            &aead_common::le_nonce(nonce),
            ad,
            ciphertext,
            out,
        )
    }

    fn decrypt_in_place(
        k: &Self::Key,
        nonce: u64,
        ad: &[u8],
        in_out: &mut [u8],
        ciphertext_len: usize,
    ) -> CipherResult<usize> {
        aead_common::decrypt_in_place(
            &Self::aead(k),
            &aead_common::le_nonce(nonce),
            ad,
            in_out,
            ciphertext_len,
        )
    }
}
