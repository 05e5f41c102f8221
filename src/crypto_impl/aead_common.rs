//! Layout shared by all AEAD-backed cipher vendors
//!
//! Noise hands the cipher a bare 64-bit counter while the RustCrypto
//! AEADs take 96-bit nonces; the counter occupies the final eight bytes
//! and the vendor picks the byte order. Buffer handling is the same for
//! every vendor: ciphertext first, detached 16-byte tag directly after
//! it, so it is implemented here once against the [`aead`] traits.

use aead::generic_array::typenum::Unsigned;
use aead::{AeadCore, AeadInPlace, Nonce, Tag};

use crate::error::{CipherError, CipherResult};

pub(crate) const NONCE_LEN: usize = 12;

fn tag_len<A: AeadCore>() -> usize {
    A::TagSize::USIZE
}

/// Counter in big-endian, leading bytes zero
pub(crate) fn be_nonce(n: u64) -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    nonce[NONCE_LEN - 8..].copy_from_slice(&n.to_be_bytes());
    nonce
}

/// Counter in little-endian, leading bytes zero
pub(crate) fn le_nonce(n: u64) -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    nonce[NONCE_LEN - 8..].copy_from_slice(&n.to_le_bytes());
    nonce
}

pub(crate) fn encrypt<A: AeadInPlace>(
    aead: &A,
    nonce: &[u8; NONCE_LEN],
    ad: &[u8],
    plaintext: &[u8],
    out: &mut [u8],
) {
    assert!(plaintext.len().checked_add(tag_len::<A>()) == Some(out.len()));

    out[..plaintext.len()].copy_from_slice(plaintext);
    encrypt_in_place(aead, nonce, ad, out, plaintext.len());
}

pub(crate) fn encrypt_in_place<A: AeadInPlace>(
    aead: &A,
    nonce: &[u8; NONCE_LEN],
    ad: &[u8],
    in_out: &mut [u8],
    plaintext_len: usize,
) -> usize {
    let out_len = plaintext_len
        .checked_add(tag_len::<A>())
        .expect("plaintext length overflow");
    assert!(out_len <= in_out.len());

    let (buffer, tag_out) = in_out[..out_len].split_at_mut(plaintext_len);
    // In-memory encryption of a prepared buffer cannot fail
    let tag = aead
        .encrypt_in_place_detached(Nonce::<A>::from_slice(nonce), ad, buffer)
        .unwrap();
    tag_out.copy_from_slice(&tag);

    out_len
}

pub(crate) fn decrypt<A: AeadInPlace>(
    aead: &A,
    nonce: &[u8; NONCE_LEN],
    ad: &[u8],
    ciphertext: &[u8],
    out: &mut [u8],
) -> CipherResult<()> {
    assert!(ciphertext.len().checked_sub(tag_len::<A>()) == Some(out.len()));

    out.copy_from_slice(&ciphertext[..out.len()]);
    let tag = Tag::<A>::from_slice(&ciphertext[out.len()..]);

    aead.decrypt_in_place_detached(Nonce::<A>::from_slice(nonce), ad, out, tag)
        .map_err(|_| CipherError::Decrypt)
}

pub(crate) fn decrypt_in_place<A: AeadInPlace>(
    aead: &A,
    nonce: &[u8; NONCE_LEN],
    ad: &[u8],
    in_out: &mut [u8],
    ciphertext_len: usize,
) -> CipherResult<usize> {
    assert!(ciphertext_len <= in_out.len());
    assert!(ciphertext_len >= tag_len::<A>());

    let (buffer, tag) = in_out[..ciphertext_len].split_at_mut(ciphertext_len - tag_len::<A>());
    aead.decrypt_in_place_detached(Nonce::<A>::from_slice(nonce), ad, buffer, Tag::<A>::from_slice(tag))
        .map_err(|_| CipherError::Decrypt)?;

    Ok(buffer.len())
}
