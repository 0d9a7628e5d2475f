//! XChaCha20-Poly1305 backend (extended 24-byte random nonce).

#[allow(deprecated)] // upstream generic-array 0.x deprecation
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};

use crate::{
    error::{CryptoError, Result},
    traits::Cipher,
};

/// Wire tag for XChaCha20-Poly1305 envelopes.
pub const TAG: u8 = 0x04;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 24;

/// XChaCha20-Poly1305 AEAD cipher.
///
/// The 192-bit nonce makes random nonces safe for effectively unlimited
/// messages under one key.
pub struct XChaCha20Poly1305Cipher;

impl Cipher for XChaCha20Poly1305Cipher {
    fn tag(&self) -> u8 {
        TAG
    }

    fn name(&self) -> &'static str {
        "xchacha20-poly1305"
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
            XChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
                cipher: self.name(),
                expected: KEY_LEN,
                actual: key.len(),
            })?;

        cipher
            .encrypt(XNonce::from_slice(nonce), Payload {
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
        let cipher = XChaCha20Poly1305::new_from_slice(key)
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        cipher
            .decrypt(XNonce::from_slice(nonce), Payload { msg: sealed, aad })
            .map_err(|_| CryptoError::AuthenticationFailed)
    }
}
