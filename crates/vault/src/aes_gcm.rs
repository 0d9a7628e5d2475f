//! AES-256-GCM backend (12-byte random nonce).

#[allow(deprecated)] // upstream generic-array 0.x deprecation
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit, Payload},
};

use crate::{
    error::{CryptoError, Result},
    traits::Cipher,
};

/// Wire tag for AES-GCM envelopes.
pub const TAG: u8 = 0x01;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// AES-256-GCM AEAD cipher.
///
/// GCM loses both confidentiality and authenticity on nonce reuse, so
/// every seal must get a fresh random nonce.
pub struct AesGcmCipher;

impl Cipher for AesGcmCipher {
    fn tag(&self) -> u8 {
        TAG
    }

    fn name(&self) -> &'static str {
        "aes-gcm"
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
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
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
            Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::AuthenticationFailed)?;

        cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: sealed, aad })
            .map_err(|_| CryptoError::AuthenticationFailed)
    }
}
