//! Symmetric state implementation
//!
//! [`SymmetricState`] is used during the handshake process to establish a cryptographic
//! state for deriving transport keys once the handshake is completed.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::bytearray::ByteArray;
use crate::cipherstate::{CipherState, CipherStates};
use crate::error::CipherResult;
use crate::traits::{Cipher, Hash};

/// Symmetric state used during handshakes to establish session hash and chaining key
#[derive(ZeroizeOnDrop, Zeroize)]
pub struct SymmetricState<C, H>
where
    C: Cipher,
    H: Hash,
{
    cipherstate: Option<CipherState<C>>,
    h: H::Output,
    ck: H::Output,
    has_psk: bool,
}

impl<C, H> SymmetricState<C, H>
where
    C: Cipher,
    H: Hash,
{
    /// Initialize new symmetric state for the given Noise protocol name
    pub(crate) fn new(protocol_name: &str) -> Self {
        let name_bytes = protocol_name.as_bytes();
        let mut h = H::Output::new_zero();

        // "If protocol_name is less than or equal to HASHLEN bytes in length, sets h equal to protocol_name
        // with zero bytes appended to make HASHLEN bytes. Otherwise sets h = HASH(protocol_name)"
        if name_bytes.len() <= H::hash_len() {
            h.as_mut()[..name_bytes.len()].copy_from_slice(name_bytes);
        } else {
            h = H::hash(name_bytes);
        }
        Self {
            cipherstate: None,
            ck: h.clone(),
            h,
            has_psk: false,
        }
    }

    /// # Protocol
    /// ```text
    /// Sets h = HASH(h || data)
    /// ```
    pub(crate) fn mix_hash(&mut self, bytes: &[u8]) {
        let mut h = H::default();
        h.input(self.h.as_slice());
        h.input(bytes);
        self.h = h.result();
    }

    /// # Protocol
    /// ```text
    /// * Sets ck, temp_k = HKDF(ck, input_key_material, 2).
    /// * If HASHLEN is 64, then truncates temp_k to 32 bytes.
    /// * Calls InitializeKey(temp_k).
    /// ```
    pub(crate) fn mix_key(&mut self, input_key_material: &[u8]) {
        let (ck, temp_k) = H::hkdf(self.ck.as_slice(), input_key_material);
        self.ck = ck;
        self.cipherstate = Some(CipherState::new(&temp_k.as_slice()[..C::key_len()], 0));
    }

    /// # Protocol
    /// ```text
    /// * Sets ck, temp = HKDF(ck, psk, 2).
    /// * Calls MixHash(temp).
    /// ```
    ///
    /// Marks the state as PSK-augmented but does not install a cipher key.
    pub(crate) fn mix_preshared_key(&mut self, psk: &[u8]) {
        let (ck, mut temp) = H::hkdf(self.ck.as_slice(), psk);
        self.ck = ck;
        self.mix_hash(temp.as_slice());
        self.has_psk = true;
        temp.zeroize();
    }

    /// Encrypt data with currently established key material and update hash
    ///
    /// The hash absorbs the bytes as they appear on the wire: the
    /// ciphertext when a key is available, the plaintext otherwise.
    ///
    /// # Warning
    /// If no key material is available, `plaintext` is simply copied to the `out` buffer
    pub(crate) fn encrypt_and_hash(
        &mut self,
        plaintext: &[u8],
        out: &mut [u8],
    ) -> CipherResult<()> {
        if let Some(ref mut c) = self.cipherstate {
            c.encrypt_with_ad(self.h.as_slice(), plaintext, out)?;
        } else {
            out.copy_from_slice(plaintext);
        };
        self.mix_hash(out);
        Ok(())
    }

    /// Decrypt data with currently established key material and update hash
    ///
    /// As with [`Self::encrypt_and_hash`], the hash absorbs the on-wire
    /// bytes, never the recovered plaintext.
    ///
    /// # Warning
    /// If no key material is available, `data` is simply copied to the `out` buffer
    pub(crate) fn decrypt_and_hash(&mut self, data: &[u8], out: &mut [u8]) -> CipherResult<()> {
        if let Some(ref mut c) = self.cipherstate {
            c.decrypt_with_ad(self.h.as_slice(), data, out)?;
        } else {
            out.copy_from_slice(data)
        }
        self.mix_hash(data);
        Ok(())
    }

    /// Return [`CipherStates`] for encrypting and decrypting transport messages
    ///
    /// The state must not be used again once split.
    ///
    /// # Panics
    /// * If no key material has been established
    pub(crate) fn split(&self) -> CipherStates<C> {
        if self.cipherstate.is_none() {
            panic!("No key material")
        }

        let (mut temp_k1, mut temp_k2) = H::hkdf(self.ck.as_slice(), &[]);

        let ct = CipherStates {
            initiator_to_responder: CipherState::new(&temp_k1.as_slice()[..C::key_len()], 0),
            responder_to_initiator: CipherState::new(&temp_k2.as_slice()[..C::key_len()], 0),
        };

        temp_k1.zeroize();
        temp_k2.zeroize();
        ct
    }

    /// Get handshake hash
    pub(crate) fn get_hash(&self) -> H::Output {
        self.h.clone()
    }

    /// Check if have already established key material
    pub(crate) fn has_key(&self) -> bool {
        self.cipherstate.is_some()
    }

    /// Check if a pre-shared key has been mixed in
    pub(crate) fn has_psk(&self) -> bool {
        self.has_psk
    }
}
