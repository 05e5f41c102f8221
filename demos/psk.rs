use core::str;

use rustle::crypto::cipher::ChaChaPoly;
use rustle::crypto::dh::X25519;
use rustle::crypto::hash::Sha512;
use rustle::handshakepattern::noise_ik;
use rustle::traits::{Dh, Handshaker};
use rustle::NoiseHandshake;

/// Pre-shared key (PSK)
const PSK: &[u8] = b"Do not tell anyone about this!!!";

fn main() {
    let mut rng_alice = rand::thread_rng();
    let mut rng_bob = rand::thread_rng();

    // Generate static keys
    let alice_s = X25519::genkey(&mut rng_alice).unwrap();
    let bob_s = X25519::genkey(&mut rng_bob).unwrap();

    // IK requires the initiator to know the responder static key up front
    let bob_s_pub = bob_s.public;

    let mut alice = NoiseHandshake::<X25519, ChaChaPoly, Sha512, _>::new(
        noise_ik(),
        &[],
        true,
        Some(alice_s),
        None,
        Some(bob_s_pub),
        None,
        Some(PSK),
        &mut rng_alice,
    )
    .unwrap();

    let mut bob = NoiseHandshake::<X25519, ChaChaPoly, Sha512, _>::new(
        noise_ik(),
        &[],
        false,
        Some(bob_s),
        None,
        None,
        None,
        Some(PSK),
        &mut rng_bob,
    )
    .unwrap();

    // Handshake message buffers
    let mut buf_alice = [0u8; 4096];
    let mut buf_bob = [0u8; 4096];

    // First handshake message from initiator to responder
    // -> e, es, s, ss
    let n = alice.write_message(&[], &mut buf_alice).unwrap();
    let _ = bob.read_message(&buf_alice[..n], &mut buf_bob).unwrap();

    // Second handshake message from responder to initiator
    // <- e, ee, es
    let n = bob.write_message(&[], &mut buf_bob).unwrap();
    let _ = alice.read_message(&buf_bob[..n], &mut buf_alice).unwrap();

    // Handshake should be done
    assert!(alice.is_finished() && bob.is_finished());

    // Finish handshakes and move to transport mode
    let mut alice = alice.finalize().unwrap();
    let mut bob = bob.finalize().unwrap();

    // Send a message from Alice to Bob
    let msg = b"Hello from initiator";
    let n = alice.send(msg, &mut buf_alice).unwrap();
    let n = bob.receive(&buf_alice[..n], &mut buf_bob).unwrap();

    println!(
        "Bob received from Alice: {}",
        str::from_utf8(&buf_bob[..n]).unwrap()
    );
}
