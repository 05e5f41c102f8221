//! Pre-made Noise handshake patterns and tools for defining new ones

use arrayvec::ArrayVec;

use crate::constants::MAX_TOKENS_PER_MESSAGE;

/// Handshake tokens as defined by the Noise spec.
///
/// The DH tokens are named from the **sender's** perspective: `ES` in a
/// message means the writer mixes `DH(e, rs)` and the reader mirrors it
/// with `DH(s, re)`. `SE` is the reverse pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    E,
    S,
    EE,
    ES,
    SE,
    SS,
}

/// Noise handshake pattern
///
/// Contains token sequences for keys known ahead of the handshake as well
/// as the actual handshake messages. Messages are stored as one flat list;
/// the initiator writes the even-indexed messages and the responder the
/// odd-indexed ones. Patterns are immutable and may be reused across any
/// number of sessions.
#[derive(Clone, Debug)]
pub struct HandshakePattern {
    name: &'static str,
    pre_initiator: ArrayVec<Token, 2>,
    pre_responder: ArrayVec<Token, 2>,
    messages: ArrayVec<ArrayVec<Token, MAX_TOKENS_PER_MESSAGE>, 4>,
    one_way: bool,
}

impl HandshakePattern {
    /// Initialize a new handshake pattern
    ///
    /// # Arguments:
    /// * `name` - Pattern name
    /// * `pre_initiator` - Initiator keys known ahead of the handshake (`E`/`S` only)
    /// * `pre_responder` - Responder keys known ahead of the handshake (`E`/`S` only)
    /// * `messages` - Handshake messages, initiator first and alternating
    /// * `one_way` - True if only the initiator transmits after the handshake
    pub fn new(
        name: &'static str,
        pre_initiator: &[Token],
        pre_responder: &[Token],
        messages: &[&[Token]],
        one_way: bool,
    ) -> Self {
        Self {
            name,
            one_way,
            pre_initiator: pre_initiator.iter().copied().collect(),
            pre_responder: pre_responder.iter().copied().collect(),
            messages: messages.iter().map(|m| m.iter().copied().collect()).collect(),
        }
    }

    /// Get number of handshake messages
    pub(crate) fn get_message_len(&self) -> usize {
        self.messages.len()
    }

    /// Get initiator pre-message tokens
    pub(crate) fn get_initiator_pre_messages(&self) -> &[Token] {
        &self.pre_initiator
    }

    /// Get responder pre-message tokens
    pub(crate) fn get_responder_pre_messages(&self) -> &[Token] {
        &self.pre_responder
    }

    /// Get handshake message by index
    ///
    /// # Panics
    /// Panics if message index is larger than the pattern length
    pub(crate) fn get_message(&self, index: usize) -> &[Token] {
        &self.messages[index]
    }

    /// Get name of the pattern
    pub fn get_name(&self) -> &'static str {
        self.name
    }

    /// Check if the pattern is one-way
    pub fn is_one_way(&self) -> bool {
        self.one_way
    }
}

// One-way patterns:

/// ```text
/// <- s
/// ...
/// -> e, es
/// ```
pub fn noise_n() -> HandshakePattern {
    HandshakePattern::new("N", &[], &[Token::S], &[&[Token::E, Token::ES]], true)
}

/// ```text
/// -> s
/// <- s
/// ...
/// -> e, es, ss
/// ```
pub fn noise_k() -> HandshakePattern {
    HandshakePattern::new(
        "K",
        &[Token::S],
        &[Token::S],
        &[&[Token::E, Token::ES, Token::SS]],
        true,
    )
}

/// ```text
/// <- s
/// ...
/// -> e, es, s, ss
/// ```
pub fn noise_x() -> HandshakePattern {
    HandshakePattern::new(
        "X",
        &[],
        &[Token::S],
        &[&[Token::E, Token::ES, Token::S, Token::SS]],
        true,
    )
}

// Interactive patterns:

/// ```text
/// -> e
/// <- e, ee
/// ```
pub fn noise_nn() -> HandshakePattern {
    HandshakePattern::new("NN", &[], &[], &[&[Token::E], &[Token::E, Token::EE]], false)
}

/// ```text
/// <- s
/// ...
/// -> e, es
/// <- e, ee
/// ```
pub fn noise_nk() -> HandshakePattern {
    HandshakePattern::new(
        "NK",
        &[],
        &[Token::S],
        &[&[Token::E, Token::ES], &[Token::E, Token::EE]],
        false,
    )
}

/// ```text
/// -> e
/// <- e, ee, s, se
/// ```
pub fn noise_nx() -> HandshakePattern {
    HandshakePattern::new(
        "NX",
        &[],
        &[],
        &[&[Token::E], &[Token::E, Token::EE, Token::S, Token::SE]],
        false,
    )
}

/// ```text
/// -> s
/// ...
/// -> e
/// <- e, ee, es
/// ```
pub fn noise_kn() -> HandshakePattern {
    HandshakePattern::new(
        "KN",
        &[Token::S],
        &[],
        &[&[Token::E], &[Token::E, Token::EE, Token::ES]],
        false,
    )
}

/// ```text
/// -> s
/// <- s
/// ...
/// -> e, es, ss
/// <- e, ee, es
/// ```
pub fn noise_kk() -> HandshakePattern {
    HandshakePattern::new(
        "KK",
        &[Token::S],
        &[Token::S],
        &[
            &[Token::E, Token::ES, Token::SS],
            &[Token::E, Token::EE, Token::ES],
        ],
        false,
    )
}

/// ```text
/// -> s
/// ...
/// -> e
/// <- e, ee, es, s, se
/// ```
pub fn noise_kx() -> HandshakePattern {
    HandshakePattern::new(
        "KX",
        &[Token::S],
        &[],
        &[
            &[Token::E],
            &[Token::E, Token::EE, Token::ES, Token::S, Token::SE],
        ],
        false,
    )
}

/// ```text
/// -> e
/// <- e, ee
/// -> s, se
/// ```
pub fn noise_xn() -> HandshakePattern {
    HandshakePattern::new(
        "XN",
        &[],
        &[],
        &[
            &[Token::E],
            &[Token::E, Token::EE],
            &[Token::S, Token::SE],
        ],
        false,
    )
}

/// ```text
/// <- s
/// ...
/// -> e, es
/// <- e, ee
/// -> s, se
/// ```
pub fn noise_xk() -> HandshakePattern {
    HandshakePattern::new(
        "XK",
        &[],
        &[Token::S],
        &[
            &[Token::E, Token::ES],
            &[Token::E, Token::EE],
            &[Token::S, Token::SE],
        ],
        false,
    )
}

/// ```text
/// -> e
/// <- e, ee, s, se
/// -> s, se
/// ```
pub fn noise_xx() -> HandshakePattern {
    HandshakePattern::new(
        "XX",
        &[],
        &[],
        &[
            &[Token::E],
            &[Token::E, Token::EE, Token::S, Token::SE],
            &[Token::S, Token::SE],
        ],
        false,
    )
}

/// ```text
/// -> e, s
/// <- e, ee, es
/// ```
pub fn noise_in() -> HandshakePattern {
    HandshakePattern::new(
        "IN",
        &[],
        &[],
        &[&[Token::E, Token::S], &[Token::E, Token::EE, Token::ES]],
        false,
    )
}

/// ```text
/// <- s
/// ...
/// -> e, es, s, ss
/// <- e, ee, es
/// ```
pub fn noise_ik() -> HandshakePattern {
    HandshakePattern::new(
        "IK",
        &[],
        &[Token::S],
        &[
            &[Token::E, Token::ES, Token::S, Token::SS],
            &[Token::E, Token::EE, Token::ES],
        ],
        false,
    )
}

/// ```text
/// -> e, s
/// <- e, ee, es, s, se
/// ```
pub fn noise_ix() -> HandshakePattern {
    HandshakePattern::new(
        "IX",
        &[],
        &[],
        &[
            &[Token::E, Token::S],
            &[Token::E, Token::EE, Token::ES, Token::S, Token::SE],
        ],
        false,
    )
}
