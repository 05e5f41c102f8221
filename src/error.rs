//! Error types used by Rustle

use displaydoc::Display;
use thiserror_no_std::Error;

/// Errors that can happen during handshake operations
#[derive(Debug, Error, Display)]
pub enum HandshakeError {
    /// Missing key material for selected pattern
    MissingMaterial,
    /// Requested an operation in invalid state
    InvalidState,
    /// Provided buffer too small for next message
    BufferTooSmall,
    /// Received invalid message
    InvalidMessage,
    /// Received peer static key does not match the configured one
    UnexpectedPeerStatic,
    /// Handshaker encountered an error earlier and has been disabled
    ErrorState,
    /// DH error: {0}
    Dh(#[from] DhError),
    /// Cipher error: {0}
    Cipher(#[from] CipherError),
    /// Transport error: {0}
    Transport(#[from] TransportError),
}

/// Handshake operation result type
pub type HandshakeResult<T> = Result<T, HandshakeError>;

/// Errors that can happen during transport operations
#[derive(Debug, Error, Display)]
pub enum TransportError {
    /// Provided buffer too small for given message
    BufferTooSmall,
    /// Received too short message for decryption
    TooShort,
    /// Tried to encrypt/decrypt data in the wrong direction after a one-way handshake
    OneWayViolation,
    /// Cipher error: {0}
    Cipher(#[from] CipherError),
}

/// Transport operation result type
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that can happen during DH operations
#[derive(Debug, Error, Display)]
pub enum DhError {
    /// Error generating keys
    KeyGeneration,
}

/// DH operation result type
pub type DhResult<T> = Result<T, DhError>;

/// Errors that can happen during Cipher operations
#[derive(Debug, Error, Display)]
pub enum CipherError {
    /// Nonce overflow
    NonceOverflow,
    /// Decrypt error
    Decrypt,
}

/// Cipher operation result type
pub type CipherResult<T> = Result<T, CipherError>;
