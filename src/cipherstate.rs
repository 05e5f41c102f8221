//! Cipherstate implementation

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::bytearray::ByteArray;
use crate::error::{CipherError, CipherResult};
use crate::traits::{Cipher, CryptoComponent};

/// Pair of [`CipherState`] instances for encrypting and decrypting transport messages
///
/// The derivation order is fixed: the initiator-to-responder key is always
/// the first HKDF output, so both peers agree on which half serves which
/// direction.
pub struct CipherStates<C: Cipher> {
    /// Cipher for initiator -> responder communication
    pub initiator_to_responder: CipherState<C>,
    /// Cipher for responder -> initiator communication
    pub responder_to_initiator: CipherState<C>,
}

/// Cipherstate for encrypting and decrypting messages
///
/// Contains the encryption key and nonce and provides
/// methods for encrypting and decrypting data.
/// Will automatically increment the nonce and return an
/// error if that overflows.
///
/// A `CipherState` cannot be cloned. Two states advancing the same
/// key with independent nonce counters is a catastrophic failure mode,
/// so raw access to the key requires consuming the state with
/// [`Self::take`].
#[derive(ZeroizeOnDrop, Zeroize)]
pub struct CipherState<C: Cipher> {
    k: C::Key,
    n: u64,
    overflowed: bool,
}

impl<C: Cipher> CryptoComponent for CipherState<C> {
    fn name() -> &'static str {
        C::name()
    }
}

impl<C: Cipher> CipherState<C> {
    /// Initialize with given key and nonce
    ///
    /// # Panics
    /// Panics if key data has incorrect length
    pub fn new(k: &[u8], n: u64) -> Self {
        Self {
            k: C::Key::from_slice(k),
            n,
            overflowed: false,
        }
    }

    fn nonce_inc_check(&mut self) {
        // "If incrementing n results in 2^(64)-1, then any further EncryptWithAd()
        // or DecryptWithAd() calls will signal an error to the caller"
        match self.n.checked_add(1) {
            None => self.overflowed = true,
            Some(n) => {
                self.n = n;
            }
        }
    }

    /// AEAD encryption
    pub fn encrypt_with_ad(
        &mut self,
        ad: &[u8],
        plaintext: &[u8],
        out: &mut [u8],
    ) -> CipherResult<()> {
        if self.overflowed {
            return Err(CipherError::NonceOverflow);
        }

        C::encrypt(&self.k, self.n, ad, plaintext, out);
        self.nonce_inc_check();

        Ok(())
    }

    /// AEAD encryption in place
    pub fn encrypt_with_ad_in_place(
        &mut self,
        ad: &[u8],
        in_out: &mut [u8],
        plaintext_len: usize,
    ) -> CipherResult<usize> {
        if self.overflowed {
            return Err(CipherError::NonceOverflow);
        }

        let size = C::encrypt_in_place(&self.k, self.n, ad, in_out, plaintext_len);
        self.nonce_inc_check();

        Ok(size)
    }

    /// AEAD decryption
    ///
    /// The nonce is advanced also when authentication fails, so a
    /// failed decryption desynchronizes this state from the peer.
    /// Callers must treat any error as fatal to the stream.
    pub fn decrypt_with_ad(
        &mut self,
        ad: &[u8],
        ciphertext: &[u8],
        out: &mut [u8],
    ) -> CipherResult<()> {
        if self.overflowed {
            return Err(CipherError::NonceOverflow);
        }

        let res = C::decrypt(&self.k, self.n, ad, ciphertext, out);
        self.nonce_inc_check();

        res
    }

    /// AEAD decryption in place
    pub fn decrypt_with_ad_in_place(
        &mut self,
        ad: &[u8],
        in_out: &mut [u8],
        ciphertext_len: usize,
    ) -> CipherResult<usize> {
        if self.overflowed {
            return Err(CipherError::NonceOverflow);
        }

        let res = C::decrypt_in_place(&self.k, self.n, ad, in_out, ciphertext_len);
        self.nonce_inc_check();

        res
    }

    /// Get current nonce value
    pub fn get_nonce(&self) -> u64 {
        self.n
    }

    /// Set nonce value
    ///
    /// # Warning
    /// **Do not reuse nonces.** Doing so WILL LEAD to a
    /// catastrophic crypto failure.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.n = nonce;
    }

    /// Take ownership of key and nonce of this state
    ///
    /// Consumes the state, so automatic nonce management ends here.
    /// Needed for transports that deliver messages out of order and
    /// carry an explicit nonce with each message.
    ///
    /// # Warning
    /// **Use with care**
    pub fn take(self) -> (C::Key, u64) {
        (self.k.clone(), self.n)
    }

    /// Rekey
    ///
    /// Rekeys as per Noise spec parts 4.2 and 11.3
    pub fn rekey(&mut self) {
        self.k = C::rekey(&self.k)
    }
}

#[cfg(test)]
mod tests {
    use super::CipherState;
    use crate::crypto::cipher::{AesGcm, ChaChaPoly};
    use crate::traits::Cipher;

    const K: &[u8] = b"A steady hiss behind the drywall";

    fn cipher_suite<C: Cipher>() {
        let mut c1 = CipherState::<C>::new(K, 0);
        let mut c2 = CipherState::<C>::new(K, 0);

        let mut c1_buf = [0u8; 4096];
        let mut c2_buf = [0u8; 4096];

        let msg = b"Loose boards creak at night";
        let cipher_len = msg.len() + C::tag_len();

        // Normal encrypt-decrypt
        c1.encrypt_with_ad(&[], msg, &mut c1_buf[..cipher_len])
            .unwrap();
        c2.decrypt_with_ad(&[], &c1_buf[..cipher_len], &mut c2_buf[..msg.len()])
            .unwrap();
        assert_eq!(*msg, c2_buf[..msg.len()]);
        assert!(c1_buf[..msg.len()] != c2_buf[..msg.len()]);

        // With AD
        c1.encrypt_with_ad(b"Hold still", msg, &mut c1_buf[..cipher_len])
            .unwrap();
        c2.decrypt_with_ad(b"Hold still", &c1_buf[..cipher_len], &mut c2_buf[..msg.len()])
            .unwrap();
        assert_eq!(*msg, c2_buf[..msg.len()]);

        // Wrong AD
        c1.encrypt_with_ad(b"Hold still", msg, &mut c1_buf[..cipher_len])
            .unwrap();
        assert!(c2
            .decrypt_with_ad(
                b"Hold still and listen",
                &c1_buf[..cipher_len],
                &mut c2_buf[..msg.len()]
            )
            .is_err());

        // Tampered ciphertext
        c1.encrypt_with_ad(&[], msg, &mut c1_buf[..cipher_len])
            .unwrap();
        c1_buf[msg.len() / 2] ^= 0x04;
        assert!(c2
            .decrypt_with_ad(&[], &c1_buf[..cipher_len], &mut c2_buf[..msg.len()])
            .is_err());

        // Nonce advanced on both sides, including past the failures,
        // so a resynchronized pair works again
        assert_eq!(c1.get_nonce(), c2.get_nonce());
        c1.encrypt_with_ad(&[], msg, &mut c1_buf[..cipher_len])
            .unwrap();
        c2.decrypt_with_ad(&[], &c1_buf[..cipher_len], &mut c2_buf[..msg.len()])
            .unwrap();
        assert_eq!(*msg, c2_buf[..msg.len()]);

        // Nonce monotonicity: N operations advance the counter by N
        let n_before = c1.get_nonce();
        for _ in 0..7 {
            c1.encrypt_with_ad(&[], msg, &mut c1_buf[..cipher_len])
                .unwrap();
        }
        assert_eq!(c1.get_nonce(), n_before + 7);

        // Out-of-sync decrypt fails
        c2.set_nonce(c1.get_nonce() + 1);
        c1.encrypt_with_ad(&[], msg, &mut c1_buf[..cipher_len])
            .unwrap();
        assert!(c2
            .decrypt_with_ad(&[], &c1_buf[..cipher_len], &mut c2_buf[..msg.len()])
            .is_err());

        // Restore nonce
        c2.set_nonce(c1.get_nonce());
        c1.encrypt_with_ad(&[], msg, &mut c1_buf[..cipher_len])
            .unwrap();
        c2.decrypt_with_ad(&[], &c1_buf[..cipher_len], &mut c2_buf[..msg.len()])
            .unwrap();
        assert_eq!(*msg, c2_buf[..msg.len()]);

        // Rekey both sides keeps the pair in sync
        c1.rekey();
        c2.rekey();
        c1.encrypt_with_ad(&[], msg, &mut c1_buf[..cipher_len])
            .unwrap();
        c2.decrypt_with_ad(&[], &c1_buf[..cipher_len], &mut c2_buf[..msg.len()])
            .unwrap();
        assert_eq!(*msg, c2_buf[..msg.len()]);

        // Rekey one side only breaks the pair
        c2.rekey();
        c1.encrypt_with_ad(&[], msg, &mut c1_buf[..cipher_len])
            .unwrap();
        assert!(c2
            .decrypt_with_ad(&[], &c1_buf[..cipher_len], &mut c2_buf[..msg.len()])
            .is_err());

        // Nonce overflow
        c1.set_nonce(u64::MAX);
        // This should be ok
        c1.encrypt_with_ad(&[], msg, &mut c1_buf[..cipher_len])
            .unwrap();
        // This and all following calls should result in an error
        assert!(c1
            .encrypt_with_ad(&[], msg, &mut c1_buf[..cipher_len])
            .is_err());
        assert!(c1
            .encrypt_with_ad(&[], msg, &mut c1_buf[..cipher_len])
            .is_err());
    }

    #[test]
    fn cipher_suite_chacha() {
        cipher_suite::<ChaChaPoly>();
    }

    #[test]
    fn cipher_suite_aes_gcm() {
        cipher_suite::<AesGcm>();
    }
}
