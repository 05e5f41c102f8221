//! Default RNG backed by the operating system

use core::num::NonZeroU32;

use rand_core::{impls, CryptoRng, Error, RngCore};

/// System RNG sourced from [`getrandom`]
///
/// The infallible [`RngCore`] methods panic if the operating system
/// entropy source fails; there is no sensible way to continue a
/// handshake without randomness.
#[derive(Default, Clone)]
pub struct DefaultRng;

fn os_error(e: getrandom::Error) -> Error {
    // Keep the raw OS code when there is one; getrandom errors without
    // one collapse to the reserved all-ones code
    let errno = e
        .raw_os_error()
        .and_then(|raw| NonZeroU32::new(raw as u32))
        .unwrap_or(NonZeroU32::new(u32::MAX).unwrap());
    Error::from(errno)
}

impl RngCore for DefaultRng {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.try_fill_bytes(dest)
            .expect("operating system RNG failure");
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        getrandom::fill(dest).map_err(os_error)
    }
}

// Getrandom provides cryptographically secure random numbers
impl CryptoRng for DefaultRng {}
