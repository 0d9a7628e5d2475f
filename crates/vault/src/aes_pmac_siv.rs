//! AES-PMAC-SIV backend (RFC 5297 SIV construction with PMAC).
//!
//! SIV derives its IV from the key, the associated data and the plaintext,
//! so there is no nonce to generate and nothing to go wrong on reuse. The
//! price is determinism: identical plaintext and associated data under the
//! same key produce identical envelopes.

use aes_siv::{aead::KeyInit, siv::Aes256PmacSiv};

use crate::{
    error::{CryptoError, Result},
    traits::Cipher,
};

/// Wire tag for AES-PMAC-SIV envelopes.
pub const TAG: u8 = 0x02;

/// Two AES-256 keys: one for PMAC, one for CTR.
const KEY_LEN: usize = 64;

/// AES-256-PMAC-SIV deterministic AEAD cipher.
///
/// Sealed layout: `[synthetic IV: 16 bytes][ciphertext]`. The synthetic IV
/// doubles as the authentication tag.
pub struct AesPmacSivCipher;

impl Cipher for AesPmacSivCipher {
    fn tag(&self) -> u8 {
        TAG
    }

    fn name(&self) -> &'static str {
        "aes-pmac-siv"
    }

    fn key_len(&self) -> usize {
        KEY_LEN
    }

    fn nonce_len(&self) -> usize {
        0
    }

    fn seal(&self, key: &[u8], nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if !nonce.is_empty() {
            return Err(CryptoError::InvalidNonceLength {
                cipher: self.name(),
                expected: 0,
                actual: nonce.len(),
            });
        }
        let mut siv = Aes256PmacSiv::new_from_slice(key).map_err(|_| {
            CryptoError::InvalidKeyLength {
                cipher: self.name(),
                expected: KEY_LEN,
                actual: key.len(),
            }
        })?;

        siv.encrypt([aad], plaintext)
            .map_err(|_| CryptoError::AuthenticationFailed)
    }

    fn open(&self, key: &[u8], nonce: &[u8], sealed: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if !nonce.is_empty() {
            return Err(CryptoError::AuthenticationFailed);
        }
        let mut siv =
            Aes256PmacSiv::new_from_slice(key).map_err(|_| CryptoError::AuthenticationFailed)?;

        siv.decrypt([aad], sealed)
            .map_err(|_| CryptoError::AuthenticationFailed)
    }
}
