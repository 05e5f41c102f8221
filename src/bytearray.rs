//! Fixed-size array utilities used throughout the crate
//!
//! All key material in this crate is handled through the [`ByteArray`]
//! compatibility trait, which keeps the algorithmic code independent of the
//! concrete storage type. [`SensitiveByteArray`] wraps any [`ByteArray`] so
//! that it is zeroized when dropped, which is how secret halves of keypairs,
//! DH outputs and cipher keys are stored.

use core::fmt::Debug;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Common trait for fixed-size byte buffers.
///
/// The associated constant [`LENGTH`](Self::LENGTH) is known at compile time,
/// so buffer lengths can be used in const contexts without dragging a const
/// generic parameter through every signature.
pub trait ByteArray: Sized + Zeroize + PartialEq + Debug + Clone {
    /// Array length
    const LENGTH: usize;

    /// Initialize a new array with zeros
    fn new_zero() -> Self;
    /// Initialize a new array by filling it with the given element
    fn new_with(_: u8) -> Self;
    /// Initialize a new array by copying it from the given slice
    ///
    /// # Panics
    /// Panics if the slice length does not match this array length
    fn from_slice(_: &[u8]) -> Self;
    /// Array length
    fn len() -> usize {
        Self::LENGTH
    }
    /// Borrow this array as a slice
    fn as_slice(&self) -> &[u8];
    /// Borrow this array as a mutable slice
    fn as_mut(&mut self) -> &mut [u8];
}

/// Encapsulation for all [`ByteArray`] types that is automatically zeroized on drop.
///
/// Also implements [`ByteArray`] itself so this is a drop-in replacement for
/// any buffer used by the crypto implementations.
#[derive(ZeroizeOnDrop, Zeroize, Clone, PartialEq, Debug)]
pub struct SensitiveByteArray<A: ByteArray>(A);

impl<A: ByteArray> SensitiveByteArray<A> {
    /// Encapsulate the given [`ByteArray`]
    pub fn new(a: A) -> Self {
        Self(a)
    }
}

impl<A: ByteArray> core::ops::Deref for SensitiveByteArray<A> {
    type Target = A;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<A: ByteArray> core::ops::DerefMut for SensitiveByteArray<A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<A: ByteArray> ByteArray for SensitiveByteArray<A> {
    const LENGTH: usize = A::LENGTH;

    fn new_zero() -> Self {
        Self::new(A::new_zero())
    }

    fn new_with(a: u8) -> Self {
        Self::new(A::new_with(a))
    }

    fn from_slice(s: &[u8]) -> Self {
        Self::new(A::from_slice(s))
    }

    fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    fn as_mut(&mut self) -> &mut [u8] {
        self.0.as_mut()
    }
}

/// Implement `ByteArray` for fixed-size `[u8; N]` arrays
impl<const N: usize> ByteArray for [u8; N] {
    const LENGTH: usize = N;

    fn new_zero() -> Self {
        [0u8; N]
    }

    fn new_with(x: u8) -> Self {
        [x; N]
    }

    fn from_slice(data: &[u8]) -> Self {
        assert_eq!(data.len(), N);
        let mut a = [0u8; N];
        a.copy_from_slice(data);
        a
    }

    fn as_slice(&self) -> &[u8] {
        self
    }

    fn as_mut(&mut self) -> &mut [u8] {
        self
    }
}
