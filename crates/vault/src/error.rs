//! Error types for keys, ciphers and envelopes.

use std::error::Error as StdError;

/// Errors produced by encryption, decryption and key loading.
///
/// Cryptographic failures are deliberately coarse: a wrong key, tampered
/// ciphertext and mismatched associated data all surface as
/// [`AuthenticationFailed`](Self::AuthenticationFailed).
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Tag mismatch, wrong key, wrong or missing associated data, or a bare
    /// key asked to open an envelope sealed by a different algorithm.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The envelope is too short or otherwise unparseable.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Unknown algorithm name (at load time) or tag (at decode time).
    #[error("unsupported cipher: {0}")]
    UnsupportedCipher(String),

    /// Composite key construction precondition violated.
    #[error("invalid key set: {0}")]
    InvalidKeySet(String),

    /// Raw secret length does not match the cipher suite.
    #[error("invalid key length for {cipher}: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        cipher: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Nonce length does not match the cipher suite.
    #[error("invalid nonce length for {cipher}: expected {expected} bytes, got {actual}")]
    InvalidNonceLength {
        cipher: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Key material is neither hex nor base64.
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// The record is sealed and no unsealer was supplied to the loader.
    #[error("key {0} is sealed and no unsealer is configured")]
    SealedKey(String),

    /// No record carries the requested identifier.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The key source collaborator failed.
    #[error("key source error: {0}")]
    KeySource(String),

    /// The object codec failed to encode or decode a value.
    #[error("serialization error: {0}")]
    Serialization(#[source] Box<dyn StdError + Send + Sync>),
}

impl CryptoError {
    #[must_use]
    pub fn serialization<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Serialization(Box::new(source))
    }

    #[must_use]
    pub fn key_source(message: impl Into<String>) -> Self {
        Self::KeySource(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CryptoError>;
