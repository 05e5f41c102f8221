use x25519_dalek::{PublicKey, StaticSecret};

use crate::bytearray::{ByteArray, SensitiveByteArray};
use crate::error::DhResult;
use crate::traits::{CryptoComponent, Dh, Rng};
use crate::KeyPair;

/// X25519 DH implementation
pub struct X25519;

impl CryptoComponent for X25519 {
    fn name() -> &'static str {
        "25519"
    }
}

impl Dh for X25519 {
    type PrivateKey = SensitiveByteArray<[u8; 32]>;
    type PubKey = [u8; 32];
    type Output = SensitiveByteArray<[u8; 32]>;

    fn genkey<R: Rng>(rng: &mut R) -> DhResult<KeyPair<Self::PubKey, Self::PrivateKey>> {
        let secret = StaticSecret::random_from_rng(rng);
        Ok(KeyPair {
            public: *PublicKey::from(&secret).as_bytes(),
            secret: SensitiveByteArray::from_slice(secret.as_bytes()),
        })
    }

    fn pubkey(k: &Self::PrivateKey) -> Self::PubKey {
        let s = StaticSecret::from(**k);
        *PublicKey::from(&s).as_bytes()
    }

    fn dh(k: &Self::PrivateKey, pk: &Self::PubKey) -> DhResult<Self::Output> {
        let k = StaticSecret::from(**k);
        let pk = PublicKey::from(*pk);
        Ok(Self::Output::from_slice(k.diffie_hellman(&pk).as_bytes()))
    }
}
