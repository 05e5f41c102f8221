//! Basic smoke tests - not full coverage on all crypto primitive combinations but good enough

use rustle::crypto::cipher::{AesGcm, ChaChaPoly};
use rustle::crypto::dh::X25519;
use rustle::crypto::hash::{Blake2b, Blake2s, Sha256, Sha512};
use rustle::handshakepattern::*;
use rustle::traits::{Cipher, Dh, Hash};
use rustle::{Handshaker, NoiseHandshake};

const PSK: &[u8; 32] = &[0x17; 32];

#[test]
fn smoke_handshakes() {
    let handshakes = [
        noise_n(),
        noise_k(),
        noise_x(),
        noise_nn(),
        noise_nk(),
        noise_nx(),
        noise_kn(),
        noise_kk(),
        noise_kx(),
        noise_xn(),
        noise_xk(),
        noise_xx(),
        noise_in(),
        noise_ik(),
        noise_ix(),
    ];

    for pattern in handshakes {
        for psk in [None, Some(&PSK[..])] {
            handshake::<X25519, ChaChaPoly, Sha512>(pattern.clone(), psk);
            handshake::<X25519, ChaChaPoly, Sha256>(pattern.clone(), psk);
            handshake::<X25519, ChaChaPoly, Blake2b>(pattern.clone(), psk);
            handshake::<X25519, ChaChaPoly, Blake2s>(pattern.clone(), psk);

            handshake::<X25519, AesGcm, Sha512>(pattern.clone(), psk);
            handshake::<X25519, AesGcm, Sha256>(pattern.clone(), psk);
            handshake::<X25519, AesGcm, Blake2b>(pattern.clone(), psk);
            handshake::<X25519, AesGcm, Blake2s>(pattern.clone(), psk);
        }
    }
}

fn handshake<DH: Dh, C: Cipher, H: Hash>(pattern: HandshakePattern, psk: Option<&[u8]>) {
    let mut rng_alice = rand::thread_rng();
    let mut rng_bob = rand::thread_rng();

    let one_way = pattern.is_one_way();

    // Generate static keys
    let alice_s = DH::genkey(&mut rng_alice).unwrap();
    let alice_s_pub = alice_s.public.clone();
    let bob_s = DH::genkey(&mut rng_bob).unwrap();
    let bob_s_pub = bob_s.public.clone();

    let mut alice = NoiseHandshake::<DH, C, H, _>::new(
        pattern.clone(),
        b"Small sounds carry far",
        true,
        Some(alice_s),
        None,
        Some(bob_s_pub),
        None,
        psk,
        &mut rng_alice,
    )
    .unwrap();

    let mut bob = NoiseHandshake::<DH, C, H, _>::new(
        pattern,
        b"Small sounds carry far",
        false,
        Some(bob_s),
        None,
        Some(alice_s_pub),
        None,
        psk,
        &mut rng_bob,
    )
    .unwrap();

    let mut alice_buf = [0u8; 4096];
    let mut bob_buf = [0u8; 4096];

    loop {
        let n = alice.write_message(&[], &mut alice_buf).unwrap();
        let _ = bob.read_message(&alice_buf[..n], &mut bob_buf).unwrap();

        if alice.is_finished() && bob.is_finished() {
            break;
        }

        let n = bob.write_message(&[], &mut bob_buf).unwrap();
        let _ = alice.read_message(&bob_buf[..n], &mut alice_buf).unwrap();

        if alice.is_finished() && bob.is_finished() {
            break;
        }
    }

    // Both sides observed the same transcript
    assert_eq!(alice.get_hash(), bob.get_hash());

    let mut alice = alice.finalize().unwrap();
    let mut bob = bob.finalize().unwrap();

    // "Normal" send-receive
    let n = alice.send(b"A creak on the stairs", &mut alice_buf).unwrap();
    let n = bob.receive(&alice_buf[..n], &mut bob_buf).unwrap();
    assert_eq!(bob_buf[..n], *b"A creak on the stairs");

    // In-place send-receive
    let mut in_place_buf = [0; 4096];
    let msg = b"Wind against the window";
    in_place_buf[..msg.len()].copy_from_slice(msg);
    let n = alice.send_in_place(&mut in_place_buf, msg.len()).unwrap();
    let n = bob.receive_in_place(&mut in_place_buf, n).unwrap();
    assert_eq!(in_place_buf[..n], *msg);

    if one_way {
        // Only the initiator may transmit after a one-way handshake
        assert!(bob.send(b"nope", &mut bob_buf).is_err());
        assert!(alice.receive(&bob_buf[..32], &mut alice_buf).is_err());
    } else {
        // Reverse direction
        let n = bob.send(b"A reply in the dark", &mut bob_buf).unwrap();
        let n = alice.receive(&bob_buf[..n], &mut alice_buf).unwrap();
        assert_eq!(alice_buf[..n], *b"A reply in the dark");
    }
}
