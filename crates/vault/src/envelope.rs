//! Self-describing ciphertext envelope.
//!
//! Layout: `[tag: 1 byte][nonce: N bytes][ciphertext || auth tag]`, where
//! `N` is fixed by the suite named in the tag. The layout carries no other
//! version information and must stay stable.

use crate::{
    error::{CryptoError, Result},
    suite::CipherSuite,
};

/// A decoded envelope borrowing from the input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub suite: CipherSuite,
    pub nonce: &'a [u8],
    pub sealed: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// Parse `bytes`. The tag is read first so that an unknown algorithm is
    /// reported as such before any length checks that depend on it.
    pub fn decode(bytes: &'a [u8]) -> Result<Self> {
        let (&tag, rest) = bytes
            .split_first()
            .ok_or_else(|| CryptoError::MalformedEnvelope("empty envelope".to_string()))?;

        let suite = CipherSuite::from_tag(tag)?;

        if bytes.len() < suite.min_envelope_len() {
            return Err(CryptoError::MalformedEnvelope(format!(
                "{} envelope needs at least {} bytes, got {}",
                suite,
                suite.min_envelope_len(),
                bytes.len()
            )));
        }

        let (nonce, sealed) = rest.split_at(suite.nonce_len());
        Ok(Self {
            suite,
            nonce,
            sealed,
        })
    }

    /// Serialize to the wire layout.
    pub fn encode(&self) -> Vec<u8> {
        encode(self.suite, self.nonce, self.sealed)
    }
}

/// Serialize a tag, nonce and sealed payload to the wire layout.
pub fn encode(suite: CipherSuite, nonce: &[u8], sealed: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + nonce.len() + sealed.len());
    out.push(suite.tag());
    out.extend_from_slice(nonce);
    out.extend_from_slice(sealed);
    out
}
