//! End-to-end scenarios over the Curve25519 + ChaCha20-Poly1305 + SHA-256 suite

use rustle::bytearray::ByteArray;
use rustle::crypto::cipher::ChaChaPoly;
use rustle::crypto::dh::X25519;
use rustle::crypto::hash::Sha256;
use rustle::error::HandshakeError;
use rustle::handshakepattern::{noise_ik, noise_nn, noise_xx};
use rustle::traits::Dh;
use rustle::{Handshaker, KeyPair, NoiseHandshake};

const PSK: &[u8; 32] = b"This is my highly secret PSK!!!!";

fn fixture_keypair(seed: u8) -> KeyPair<[u8; 32], <X25519 as Dh>::PrivateKey> {
    let secret = <X25519 as Dh>::PrivateKey::from_slice(&[seed; 32]);
    KeyPair {
        public: X25519::pubkey(&secret),
        secret,
    }
}

/// -> e
/// <- e, ee
///
/// Both sides derive the same transport keys and the two directions differ.
#[test]
fn scenario_nn() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        true,
        None,
        None,
        None,
        None,
        None,
        &mut rng_a,
    )
    .unwrap();
    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        false,
        None,
        None,
        None,
        None,
        None,
        &mut rng_b,
    )
    .unwrap();

    let mut buf_a = [0u8; 1024];
    let mut buf_b = [0u8; 1024];

    let n = alice.write_message(&[], &mut buf_a).unwrap();
    let n = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();
    assert_eq!(n, 0);

    let n = bob.write_message(&[], &mut buf_b).unwrap();
    let n = alice.read_message(&buf_b[..n], &mut buf_a).unwrap();
    assert_eq!(n, 0);

    assert!(alice.is_finished() && bob.is_finished());
    assert_eq!(alice.get_hash(), bob.get_hash());

    let alice_c = alice.finalize().unwrap().take();
    let bob_c = bob.finalize().unwrap().take();

    let a_send = alice_c.initiator_to_responder.take();
    let a_recv = alice_c.responder_to_initiator.take();
    let b_send = bob_c.initiator_to_responder.take();
    let b_recv = bob_c.responder_to_initiator.take();

    // Byte-identical pairs, and the directions use distinct keys
    assert_eq!(a_send, b_send);
    assert_eq!(a_recv, b_recv);
    assert_ne!(a_send.0, a_recv.0);
}

/// -> e
/// <- e, ee, s, se
/// -> s, se
///
/// Payloads ride along each handshake message and both transcripts agree.
#[test]
fn scenario_xx_payloads() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let alice_s = fixture_keypair(0x61);
    let bob_s = fixture_keypair(0x62);

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_xx(),
        b"abc",
        true,
        Some(alice_s),
        None,
        None,
        None,
        None,
        &mut rng_a,
    )
    .unwrap();
    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_xx(),
        b"abc",
        false,
        Some(bob_s),
        None,
        None,
        None,
        None,
        &mut rng_b,
    )
    .unwrap();

    let mut buf_a = [0u8; 1024];
    let mut buf_b = [0u8; 1024];

    let n = alice.write_message(b"hello", &mut buf_a).unwrap();
    let n = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();
    assert_eq!(&buf_b[..n], b"hello");

    let n = bob.write_message(b"world", &mut buf_b).unwrap();
    let n = alice.read_message(&buf_b[..n], &mut buf_a).unwrap();
    assert_eq!(&buf_a[..n], b"world");

    let n = alice.write_message(b"!", &mut buf_a).unwrap();
    let n = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();
    assert_eq!(&buf_b[..n], b"!");

    assert!(alice.is_finished() && bob.is_finished());
    assert_eq!(alice.get_hash(), bob.get_hash());

    // The handshake authenticated both statics to the peer
    assert_eq!(
        bob.get_remote_static().unwrap(),
        fixture_keypair(0x61).public
    );
    assert_eq!(
        alice.get_remote_static().unwrap(),
        fixture_keypair(0x62).public
    );
}

/// <- s
/// ...
/// -> e, es, s, ss
/// <- e, ee, es
///
/// IK with a PSK and the responder static pinned on the initiator. The
/// transport afterwards carries a maximum-size payload.
#[test]
fn scenario_ik_psk() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let alice_s = fixture_keypair(0x41);
    let bob_s = fixture_keypair(0x42);
    let bob_s_pub = bob_s.public;

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_ik(),
        &[],
        true,
        Some(alice_s),
        None,
        Some(bob_s_pub),
        None,
        Some(PSK),
        &mut rng_a,
    )
    .unwrap();
    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_ik(),
        &[],
        false,
        Some(bob_s),
        None,
        None,
        None,
        Some(PSK),
        &mut rng_b,
    )
    .unwrap();

    let mut buf_a = vec![0u8; 70000];
    let mut buf_b = vec![0u8; 70000];

    let n = alice.write_message(&[], &mut buf_a).unwrap();
    let _ = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();
    let n = bob.write_message(&[], &mut buf_b).unwrap();
    let _ = alice.read_message(&buf_b[..n], &mut buf_a).unwrap();

    assert!(alice.is_finished() && bob.is_finished());

    let mut alice = alice.finalize().unwrap();
    let mut bob = bob.finalize().unwrap();

    // Maximum-size payload passes
    let payload = vec![0xAA; 65535];
    let n = alice.send(&payload, &mut buf_a).unwrap();
    let n = bob.receive(&buf_a[..n], &mut buf_b).unwrap();
    assert_eq!(buf_b[..n], payload[..]);
}

/// One byte over the maximum payload size is a programmer error
#[test]
#[should_panic(expected = "Maximum Noise message length exceeded")]
fn scenario_ik_psk_oversize() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let alice_s = fixture_keypair(0x41);
    let bob_s = fixture_keypair(0x42);
    let bob_s_pub = bob_s.public;

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_ik(),
        &[],
        true,
        Some(alice_s),
        None,
        Some(bob_s_pub),
        None,
        Some(PSK),
        &mut rng_a,
    )
    .unwrap();
    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_ik(),
        &[],
        false,
        Some(bob_s),
        None,
        None,
        None,
        Some(PSK),
        &mut rng_b,
    )
    .unwrap();

    let mut buf_a = vec![0u8; 70000];
    let mut buf_b = vec![0u8; 70000];

    let n = alice.write_message(&[], &mut buf_a).unwrap();
    let _ = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();
    let n = bob.write_message(&[], &mut buf_b).unwrap();
    let _ = alice.read_message(&buf_b[..n], &mut buf_a).unwrap();

    let mut alice = alice.finalize().unwrap();

    let payload = vec![0xAA; 65536];
    let _ = alice.send(&payload, &mut buf_a);
}

/// Flipping any bit of a handshake message fails authentication and
/// poisons the handshake
#[test]
fn scenario_tamper() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let alice_s = fixture_keypair(0x61);
    let bob_s = fixture_keypair(0x62);

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_xx(),
        &[],
        true,
        Some(alice_s),
        None,
        None,
        None,
        None,
        &mut rng_a,
    )
    .unwrap();
    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_xx(),
        &[],
        false,
        Some(bob_s),
        None,
        None,
        None,
        None,
        &mut rng_b,
    )
    .unwrap();

    let mut buf_a = [0u8; 1024];
    let mut buf_b = [0u8; 1024];

    let n = alice.write_message(&[], &mut buf_a).unwrap();
    let _ = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();

    // Message 2 carries the first authenticated field; flip one bit
    let n = bob.write_message(&[], &mut buf_b).unwrap();
    buf_b[n / 2] ^= 0x01;
    let err = alice.read_message(&buf_b[..n], &mut buf_a).unwrap_err();
    assert!(matches!(err, HandshakeError::Cipher(_)));

    // No transport states come out of a failed handshake
    assert!(!alice.is_finished());
    assert!(alice.finalize().is_err());
}

/// A poisoned handshake refuses all further use
#[test]
fn scenario_error_state_is_sticky() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        true,
        None,
        None,
        None,
        None,
        None,
        &mut rng_a,
    )
    .unwrap();
    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        false,
        None,
        None,
        None,
        None,
        None,
        &mut rng_b,
    )
    .unwrap();

    let mut buf_a = [0u8; 1024];
    let mut buf_b = [0u8; 1024];

    let n = alice.write_message(&[], &mut buf_a).unwrap();
    let _ = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();
    let n = bob.write_message(&[], &mut buf_b).unwrap();

    // Corrupt the final message so the payload tag fails
    buf_b[n - 1] ^= 0x80;
    assert!(alice.read_message(&buf_b[..n], &mut buf_a).is_err());

    let err = alice.read_message(&buf_b[..n], &mut buf_a).unwrap_err();
    assert!(matches!(err, HandshakeError::ErrorState));
    let err = alice.write_message(&[], &mut buf_a).unwrap_err();
    assert!(matches!(err, HandshakeError::ErrorState));
}

/// After split the transport enforces in-order delivery
#[test]
fn scenario_out_of_order() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        true,
        None,
        None,
        None,
        None,
        None,
        &mut rng_a,
    )
    .unwrap();
    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        false,
        None,
        None,
        None,
        None,
        None,
        &mut rng_b,
    )
    .unwrap();

    let mut buf_a = [0u8; 1024];
    let mut buf_b = [0u8; 1024];

    let n = alice.write_message(&[], &mut buf_a).unwrap();
    let _ = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();
    let n = bob.write_message(&[], &mut buf_b).unwrap();
    let _ = alice.read_message(&buf_b[..n], &mut buf_a).unwrap();

    let mut alice = alice.finalize().unwrap();
    let mut bob = bob.finalize().unwrap();

    let mut first = [0u8; 64];
    let mut second = [0u8; 64];
    let n1 = alice.send(b"first", &mut first).unwrap();
    let n2 = alice.send(b"second", &mut second).unwrap();

    // Delivering the second message first must fail authentication
    assert!(bob.receive(&second[..n2], &mut buf_b).is_err());

    // And nonce bookkeeping reflects both operations
    assert_eq!(alice.sending_nonce(), 2);
    assert_eq!(bob.receiving_nonce(), 1);

    // The failed receive advanced the inbound nonce past the first
    // message, so in-order recovery needs explicit nonce management
    assert!(bob.receive(&first[..n1], &mut buf_b).is_err());
    bob.set_receiving_nonce(0);
    let n = bob.receive(&first[..n1], &mut buf_b).unwrap();
    assert_eq!(&buf_b[..n], b"first");
}

/// The protocol name reflects PSK usage and seeds distinct transcripts
#[test]
fn scenario_psk_name_prefix() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let plain = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        true,
        None,
        None,
        None,
        None,
        None,
        &mut rng_a,
    )
    .unwrap();
    let psk = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        true,
        None,
        None,
        None,
        None,
        Some(PSK),
        &mut rng_b,
    )
    .unwrap();

    assert_eq!(plain.get_name().as_str(), "Noise_NN_25519_ChaChaPoly_SHA256");
    assert_eq!(
        psk.get_name().as_str(),
        "NoisePSK_NN_25519_ChaChaPoly_SHA256"
    );

    // Different protocol names and PSK mixing yield different hashes
    // before any message is exchanged
    assert_ne!(plain.get_hash(), psk.get_hash());
}

/// A message truncated below its token requirements is rejected before
/// any state is touched
#[test]
fn scenario_truncated_message() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        true,
        None,
        None,
        None,
        None,
        None,
        &mut rng_a,
    )
    .unwrap();
    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        false,
        None,
        None,
        None,
        None,
        None,
        &mut rng_b,
    )
    .unwrap();

    let mut buf_a = [0u8; 1024];
    let mut buf_b = [0u8; 1024];

    let n = alice.write_message(&[], &mut buf_a).unwrap();
    let err = bob.read_message(&buf_a[..n - 1], &mut buf_b).unwrap_err();
    assert!(matches!(err, HandshakeError::InvalidMessage));

    // The full message is still accepted afterwards
    let _ = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();

    let n = bob.write_message(&[], &mut buf_b).unwrap();
    let err = alice.read_message(&buf_b[..n - 17], &mut buf_a).unwrap_err();
    assert!(matches!(err, HandshakeError::InvalidMessage));

    let _ = alice.read_message(&buf_b[..n], &mut buf_a).unwrap();
    assert!(alice.is_finished() && bob.is_finished());
}

/// A prologue mismatch surfaces at the first authenticated field
#[test]
fn scenario_prologue_mismatch() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let alice_s = fixture_keypair(0x61);
    let bob_s = fixture_keypair(0x62);

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_xx(),
        b"abc",
        true,
        Some(alice_s),
        None,
        None,
        None,
        None,
        &mut rng_a,
    )
    .unwrap();
    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_xx(),
        b"abd",
        false,
        Some(bob_s),
        None,
        None,
        None,
        None,
        &mut rng_b,
    )
    .unwrap();

    let mut buf_a = [0u8; 1024];
    let mut buf_b = [0u8; 1024];

    // Message 1 is plaintext and passes despite the diverged transcripts
    let n = alice.write_message(&[], &mut buf_a).unwrap();
    let _ = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();

    // Message 2 is the first to carry a key and fails
    let n = bob.write_message(&[], &mut buf_b).unwrap();
    let err = alice.read_message(&buf_b[..n], &mut buf_a).unwrap_err();
    assert!(matches!(err, HandshakeError::Cipher(_)));
}

/// A pinned remote static that does not match the transmitted one is
/// rejected even though authentication passes
#[test]
fn scenario_unexpected_peer_static() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let alice_s = fixture_keypair(0x61);
    let bob_s = fixture_keypair(0x62);
    let somebody_else = fixture_keypair(0x63);

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_xx(),
        &[],
        true,
        Some(alice_s),
        None,
        Some(somebody_else.public),
        None,
        None,
        &mut rng_a,
    )
    .unwrap();
    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_xx(),
        &[],
        false,
        Some(bob_s),
        None,
        None,
        None,
        None,
        &mut rng_b,
    )
    .unwrap();

    let mut buf_a = [0u8; 1024];
    let mut buf_b = [0u8; 1024];

    let n = alice.write_message(&[], &mut buf_a).unwrap();
    let _ = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();

    let n = bob.write_message(&[], &mut buf_b).unwrap();
    let err = alice.read_message(&buf_b[..n], &mut buf_a).unwrap_err();
    assert!(matches!(err, HandshakeError::UnexpectedPeerStatic));
}

/// Out-of-turn calls are rejected without touching the state
#[test]
fn scenario_turn_enforcement() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        true,
        None,
        None,
        None,
        None,
        None,
        &mut rng_a,
    )
    .unwrap();
    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        false,
        None,
        None,
        None,
        None,
        None,
        &mut rng_b,
    )
    .unwrap();

    let mut buf_a = [0u8; 1024];
    let mut buf_b = [0u8; 1024];

    // Responder cannot write first, initiator cannot read first
    let err = bob.write_message(&[], &mut buf_b).unwrap_err();
    assert!(matches!(err, HandshakeError::InvalidState));
    let err = alice.read_message(&buf_b[..32], &mut buf_a).unwrap_err();
    assert!(matches!(err, HandshakeError::InvalidState));

    let n = alice.write_message(&[], &mut buf_a).unwrap();

    // Writing twice in a row is rejected
    let err = alice.write_message(&[], &mut buf_a).unwrap_err();
    assert!(matches!(err, HandshakeError::InvalidState));

    let _ = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();
    let n = bob.write_message(&[], &mut buf_b).unwrap();
    let _ = alice.read_message(&buf_b[..n], &mut buf_a).unwrap();

    // The pattern is exhausted; the state machine is spent
    let err = alice.write_message(&[], &mut buf_a).unwrap_err();
    assert!(matches!(err, HandshakeError::InvalidState));
    let err = bob.read_message(&buf_a[..48], &mut buf_b).unwrap_err();
    assert!(matches!(err, HandshakeError::InvalidState));
}

/// A pattern that transmits a static requires one to be configured
#[test]
fn scenario_missing_static() {
    let mut rng_a = rand::thread_rng();
    let mut rng_b = rand::thread_rng();

    let bob_s = fixture_keypair(0x62);

    // Alice has no static keypair although XX transmits one
    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_xx(),
        &[],
        true,
        None,
        None,
        None,
        None,
        None,
        &mut rng_a,
    )
    .unwrap();
    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_xx(),
        &[],
        false,
        Some(bob_s),
        None,
        None,
        None,
        None,
        &mut rng_b,
    )
    .unwrap();

    let mut buf_a = [0u8; 1024];
    let mut buf_b = [0u8; 1024];

    let n = alice.write_message(&[], &mut buf_a).unwrap();
    let _ = bob.read_message(&buf_a[..n], &mut buf_b).unwrap();
    let n = bob.write_message(&[], &mut buf_b).unwrap();
    let _ = alice.read_message(&buf_b[..n], &mut buf_a).unwrap();

    let err = alice.write_message(&[], &mut buf_a).unwrap_err();
    assert!(matches!(err, HandshakeError::MissingMaterial));
}

/// Payloads above the message cap are a programmer error also during
/// the handshake
#[test]
#[should_panic(expected = "Maximum Noise message length exceeded")]
fn scenario_handshake_payload_cap() {
    let mut rng_a = rand::thread_rng();

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha256, _>::new(
        noise_nn(),
        &[],
        true,
        None,
        None,
        None,
        None,
        None,
        &mut rng_a,
    )
    .unwrap();

    let payload = vec![0u8; 65536];
    let mut buf_a = vec![0u8; 70000];
    let _ = alice.write_message(&payload, &mut buf_a);
}
