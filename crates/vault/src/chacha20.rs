//! ChaCha20-Poly1305 backend (RFC 8439, 12-byte random nonce).

#[allow(deprecated)] // upstream generic-array 0.x deprecation
use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit, Payload},
};

use crate::{
    error::{CryptoError, Result},
    traits::Cipher,
};

/// Wire tag for ChaCha20-Poly1305 envelopes.
pub const TAG: u8 = 0x03;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// ChaCha20-Poly1305 AEAD cipher.
pub struct ChaCha20Poly1305Cipher;

impl Cipher for ChaCha20Poly1305Cipher {
    fn tag(&self) -> u8 {
        TAG
    }

    fn name(&self) -> &'static str {
        "chacha20-poly1305"
    }

    fn key_len(&self) -> usize {
        KEY_LEN
    }

    fn nonce_len(&self) -> usize {
        NONCE_LEN
    }

    #[allow(deprecated)]
    fn seal(&self, key: &[u8], nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if nonce.len() != NONCE_LEN {
            return Err(CryptoError::InvalidNonceLength {
                cipher: self.name(),
                expected: NONCE_LEN,
                actual: nonce.len(),
            });
        }
        let cipher =
            ChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
                cipher: self.name(),
                expected: KEY_LEN,
                actual: key.len(),
            })?;

        cipher
            .encrypt(Nonce::from_slice(nonce), Payload {
                msg: plaintext,
                aad,
            })
            .map_err(|_| CryptoError::AuthenticationFailed)
    }

    #[allow(deprecated)]
    fn open(&self, key: &[u8], nonce: &[u8], sealed: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if nonce.len() != NONCE_LEN {
            return Err(CryptoError::AuthenticationFailed);
        }
        let cipher =
            ChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::AuthenticationFailed)?;

        cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: sealed, aad })
            .map_err(|_| CryptoError::AuthenticationFailed)
    }
}
