//! Noise handshake state machine
//!
//! [`NoiseHandshake`] interprets a [`HandshakePattern`] token by token,
//! mutating the underlying [`SymmetricState`] in the fixed order the
//! protocol demands and producing or consuming one handshake message per
//! call. Once every message has been processed the handshake can be
//! finalized into a [`crate::transportstate::TransportState`].

use core::fmt::Write;

use arrayvec::{ArrayString, ArrayVec};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::bytearray::ByteArray;
use crate::cipherstate::CipherStates;
use crate::constants::{MAX_TOKENS_PER_MESSAGE, PSK_LEN};
use crate::error::{HandshakeError, HandshakeResult};
use crate::handshakepattern::{HandshakePattern, Token};
use crate::symmetricstate::SymmetricState;
use crate::traits::{Cipher, CryptoRng, Dh, Handshaker, HandshakerInternal, Hash, RngCore};
use crate::KeyPair;

/// Handshake status
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStatus {
    /// Our turn to send
    Send,
    /// Our turn to receive
    Receive,
    /// Handshake ready
    Ready,
    /// Handshake error - can't continue
    Error,
}

/// Noise handshake
///
/// Construct with the desired [`HandshakePattern`] and drive to completion
/// with the [`Handshaker`] methods. Both peers process the same flat message
/// list; whose turn it is to write follows from the initiator flag and the
/// message index.
pub struct NoiseHandshake<'a, DH, C, H, RNG>
where
    DH: Dh,
    C: Cipher,
    H: Hash,
    RNG: RngCore + CryptoRng,
{
    symmetricstate: SymmetricState<C, H>,
    s: Option<KeyPair<DH::PubKey, DH::PrivateKey>>,
    e: Option<KeyPair<DH::PubKey, DH::PrivateKey>>,
    rs: Option<DH::PubKey>,
    re: Option<DH::PubKey>,
    pattern: HandshakePattern,
    initiator: bool,
    status: HandshakeStatus,
    msg_idx: usize,
    rng: &'a mut RNG,
}

impl<'a, DH, C, H, RNG> NoiseHandshake<'a, DH, C, H, RNG>
where
    DH: Dh,
    C: Cipher,
    H: Hash,
    RNG: RngCore + CryptoRng,
{
    /// Initialize a new Noise handshake
    ///
    /// # Arguments:
    /// * `pattern` - Handshake pattern
    /// * `prologue` - Optional prologue data for the handshake
    /// * `initiator` - True if we are the initiator
    /// * `s` - Our static keypair
    /// * `e` - Our ephemeral keypair - Shouldn't usually be provided manually
    /// * `rs` - Peer public static key
    /// * `re` - Peer public ephemeral key - Shouldn't usually be provided manually
    /// * `psk` - Optional pre-shared key, mixed into the chaining key at initialization
    /// * `rng` - RNG to use during the handshake
    ///
    /// Any key the pattern names in a pre-message must be supplied here.
    /// A supplied `rs` is also treated as an expectation: if the peer later
    /// transmits a different static key, the handshake fails with
    /// [`HandshakeError::UnexpectedPeerStatic`].
    ///
    /// # Generic parameters:
    /// * `DH` - DH algorithm to use
    /// * `C` - Cipher algorithm to use
    /// * `H` - Hashing algorithm to use
    ///
    /// # Panics
    /// If a pre-shared key is supplied and is not [`PSK_LEN`] bytes
    #[allow(clippy::too_many_arguments)] // Okay for now
    pub fn new(
        pattern: HandshakePattern,
        prologue: &[u8],
        initiator: bool,
        s: Option<KeyPair<DH::PubKey, DH::PrivateKey>>,
        e: Option<KeyPair<DH::PubKey, DH::PrivateKey>>,
        rs: Option<DH::PubKey>,
        re: Option<DH::PubKey>,
        psk: Option<&[u8]>,
        rng: &'a mut RNG,
    ) -> Result<NoiseHandshake<'a, DH, C, H, RNG>, HandshakeError> {
        // Initialize symmetric state, mix in prologue and possible PSK
        let name = <Self as Handshaker<C, H>>::build_name(&pattern, psk.is_some());
        let mut ss = SymmetricState::new(&name);
        ss.mix_hash(prologue);
        if let Some(psk) = psk {
            assert_eq!(psk.len(), PSK_LEN, "Invalid pre-shared key length");
            ss.mix_preshared_key(psk);
        }

        // Mix in keys the peers know ahead of the handshake, each viewed
        // from this peer's role
        for &token in pattern.get_initiator_pre_messages() {
            let key = match (token, initiator) {
                (Token::S, true) => s.as_ref().map(|k| &k.public),
                (Token::S, false) => rs.as_ref(),
                (Token::E, true) => e.as_ref().map(|k| &k.public),
                (Token::E, false) => re.as_ref(),
                _ => panic!("Invalid pre-message token in pattern"),
            };
            ss.mix_hash(key.ok_or(HandshakeError::MissingMaterial)?.as_slice());
        }
        for &token in pattern.get_responder_pre_messages() {
            let key = match (token, initiator) {
                (Token::S, false) => s.as_ref().map(|k| &k.public),
                (Token::S, true) => rs.as_ref(),
                (Token::E, false) => e.as_ref().map(|k| &k.public),
                (Token::E, true) => re.as_ref(),
                _ => panic!("Invalid pre-message token in pattern"),
            };
            ss.mix_hash(key.ok_or(HandshakeError::MissingMaterial)?.as_slice());
        }

        let status = if initiator {
            HandshakeStatus::Send
        } else {
            HandshakeStatus::Receive
        };

        Ok(Self {
            symmetricstate: ss,
            s,
            e,
            rs,
            re,
            pattern,
            initiator,
            status,
            msg_idx: 0,
            rng,
        })
    }

    /// Get next message we are about to send or receive
    fn get_next_message(&self) -> HandshakeResult<&[Token]> {
        match self.status {
            HandshakeStatus::Send | HandshakeStatus::Receive => {
                Ok(self.pattern.get_message(self.msg_idx))
            }
            _ => Err(HandshakeError::InvalidState),
        }
    }

    /// Check if we have already completed the pattern and if so, update internal state.
    fn update_status(&mut self) {
        if self.msg_idx == self.pattern.get_message_len() {
            self.status = HandshakeStatus::Ready;
        } else if self.status == HandshakeStatus::Receive {
            self.status = HandshakeStatus::Send;
        } else {
            self.status = HandshakeStatus::Receive;
        }
    }

    fn dh(
        keys: &Option<KeyPair<DH::PubKey, DH::PrivateKey>>,
        public: &Option<DH::PubKey>,
    ) -> HandshakeResult<DH::Output> {
        let keys = keys.as_ref().ok_or(HandshakeError::MissingMaterial)?;
        let public = public.as_ref().ok_or(HandshakeError::MissingMaterial)?;
        Ok(DH::dh(&keys.secret, public)?)
    }

    /// Map a DH token to a concrete key exchange
    ///
    /// Tokens name the key pairing from the sender's point of view, so the
    /// reader mirrors the mixed `ES`/`SE` tokens.
    fn map_dh(&self, token: Token, writing: bool) -> HandshakeResult<DH::Output> {
        match (token, writing) {
            (Token::EE, _) => Self::dh(&self.e, &self.re),
            (Token::ES, true) | (Token::SE, false) => Self::dh(&self.e, &self.rs),
            (Token::SE, true) | (Token::ES, false) => Self::dh(&self.s, &self.re),
            (Token::SS, _) => Self::dh(&self.s, &self.rs),
            _ => unreachable!(),
        }
    }
}

impl<'a, DH, C, H, RNG> HandshakerInternal<C, H> for NoiseHandshake<'a, DH, C, H, RNG>
where
    DH: Dh,
    C: Cipher,
    H: Hash,
    RNG: RngCore + CryptoRng,
{
    fn status(&self) -> HandshakeStatus {
        self.status
    }

    fn set_error(&mut self) {
        self.status = HandshakeStatus::Error;
        self.symmetricstate.zeroize();
    }

    fn write_message_impl(&mut self, payload: &[u8], out: &mut [u8]) -> HandshakeResult<usize> {
        let out_len = payload.len() + self.get_next_message_overhead()?;
        let tokens: ArrayVec<Token, MAX_TOKENS_PER_MESSAGE> = self
            .pattern
            .get_message(self.msg_idx)
            .iter()
            .copied()
            .collect();

        let mut cur = 0_usize;
        for token in tokens {
            match token {
                Token::E => {
                    if self.e.is_none() {
                        self.e = Some(DH::genkey(self.rng)?);
                    }

                    let e_pub = &self.e.as_ref().unwrap().public;
                    out[cur..cur + DH::PubKey::len()].copy_from_slice(e_pub.as_slice());
                    cur += DH::PubKey::len();

                    let e_pub = e_pub.clone();
                    self.symmetricstate.mix_hash(e_pub.as_slice());
                    if self.symmetricstate.has_psk() {
                        self.symmetricstate.mix_key(e_pub.as_slice());
                    }
                }
                Token::S => {
                    let s_pub = self
                        .s
                        .as_ref()
                        .ok_or(HandshakeError::MissingMaterial)?
                        .public
                        .clone();

                    let len = if self.symmetricstate.has_key() {
                        DH::PubKey::len() + C::tag_len()
                    } else {
                        DH::PubKey::len()
                    };

                    self.symmetricstate
                        .encrypt_and_hash(s_pub.as_slice(), &mut out[cur..cur + len])?;
                    cur += len;
                }
                t @ (Token::EE | Token::ES | Token::SE | Token::SS) => {
                    let dh_result = self.map_dh(t, true)?;
                    self.symmetricstate.mix_key(dh_result.as_slice());
                }
            }
        }

        self.symmetricstate
            .encrypt_and_hash(payload, &mut out[cur..out_len])?;

        self.msg_idx += 1;
        self.update_status();
        Ok(out_len)
    }

    fn read_message_impl(&mut self, message: &[u8], out: &mut [u8]) -> HandshakeResult<usize> {
        let out_len = message.len() - self.get_next_message_overhead()?;
        let tokens: ArrayVec<Token, MAX_TOKENS_PER_MESSAGE> = self
            .pattern
            .get_message(self.msg_idx)
            .iter()
            .copied()
            .collect();

        // Consume the next `n` bytes of message data
        let mut message = message;
        let mut get = |n| {
            let ret;
            (ret, message) = message.split_at(n);
            ret
        };

        for token in tokens {
            match token {
                Token::E => {
                    let re = DH::PubKey::from_slice(get(DH::PubKey::len()));
                    self.symmetricstate.mix_hash(re.as_slice());
                    if self.symmetricstate.has_psk() {
                        self.symmetricstate.mix_key(re.as_slice());
                    }
                    self.re = Some(re);
                }
                Token::S => {
                    let len = if self.symmetricstate.has_key() {
                        DH::PubKey::len() + C::tag_len()
                    } else {
                        DH::PubKey::len()
                    };

                    let mut rs = DH::PubKey::new_zero();
                    self.symmetricstate.decrypt_and_hash(get(len), rs.as_mut())?;

                    // A preconfigured remote static is an expectation
                    if let Some(expected) = self.rs.as_ref() {
                        if expected.as_slice().ct_eq(rs.as_slice()).unwrap_u8() == 0 {
                            return Err(HandshakeError::UnexpectedPeerStatic);
                        }
                    }
                    self.rs = Some(rs);
                }
                t @ (Token::EE | Token::ES | Token::SE | Token::SS) => {
                    let dh_result = self.map_dh(t, false)?;
                    self.symmetricstate.mix_key(dh_result.as_slice());
                }
            }
        }

        self.symmetricstate
            .decrypt_and_hash(message, &mut out[..out_len])?;

        self.msg_idx += 1;
        self.update_status();
        Ok(out_len)
    }

    fn get_ciphers(&self) -> CipherStates<C> {
        self.symmetricstate.split()
    }

    fn has_psk(&self) -> bool {
        self.symmetricstate.has_psk()
    }

    fn get_pattern(&self) -> HandshakePattern {
        self.pattern.clone()
    }
}

impl<'a, DH, C, H, RNG> Handshaker<C, H> for NoiseHandshake<'a, DH, C, H, RNG>
where
    DH: Dh,
    C: Cipher,
    H: Hash,
    RNG: RngCore + CryptoRng,
{
    type E = DH::PubKey;
    type S = DH::PubKey;

    fn is_write_turn(&self) -> bool {
        self.status == HandshakeStatus::Send
    }

    fn is_initiator(&self) -> bool {
        self.initiator
    }

    fn get_next_message_overhead(&self) -> HandshakeResult<usize> {
        let message = self.get_next_message()?;

        let mut overhead = 0;
        let mut has_key = self.symmetricstate.has_key();
        let has_psk = self.symmetricstate.has_psk();

        for &token in message {
            match token {
                Token::E => {
                    overhead += DH::PubKey::len();
                    // With a PSK, the ephemeral doubles as key material
                    if has_psk {
                        has_key = true;
                    }
                }
                Token::S => {
                    overhead += DH::PubKey::len();
                    if has_key {
                        overhead += C::tag_len();
                    }
                }
                Token::EE | Token::ES | Token::SE | Token::SS => {
                    has_key = true;
                }
            }
        }

        if has_key {
            overhead += C::tag_len();
        }

        Ok(overhead)
    }

    fn build_name(pattern: &HandshakePattern, psk: bool) -> ArrayString<128> {
        let prefix = if psk { "NoisePSK" } else { "Noise" };
        let mut ret = ArrayString::new();
        write!(
            &mut ret,
            "{}_{}_{}_{}_{}",
            prefix,
            pattern.get_name(),
            DH::name(),
            C::name(),
            H::name()
        )
        .unwrap();
        ret
    }

    fn get_hash(&self) -> H::Output {
        self.symmetricstate.get_hash()
    }

    fn get_remote_static(&self) -> Option<Self::S> {
        self.rs.clone()
    }

    fn get_remote_ephemeral(&self) -> Option<Self::E> {
        self.re.clone()
    }
}
