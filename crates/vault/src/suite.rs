//! The closed set of supported cipher suites.

use std::{fmt, str::FromStr};

use rand::RngCore;

use crate::{
    aes_gcm::AesGcmCipher,
    aes_pmac_siv::AesPmacSivCipher,
    chacha20::ChaCha20Poly1305Cipher,
    error::{CryptoError, Result},
    traits::Cipher,
    xchacha20::XChaCha20Poly1305Cipher,
};

/// Length of the authentication tag appended by every suite.
pub const AUTH_TAG_LEN: usize = 16;

/// How a suite obtains the per-message nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoncePolicy {
    /// Fresh random bytes on every seal. Reuse under one key is catastrophic.
    Random,
    /// No nonce; the IV is synthesized from key, associated data and plaintext.
    Synthetic,
}

/// Supported AEAD algorithms.
///
/// The envelope's first byte is [`tag`](Self::tag), so any holder of the
/// right key material can pick the suite without out-of-band information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CipherSuite {
    AesGcm,
    AesPmacSiv,
    ChaCha20Poly1305,
    XChaCha20Poly1305,
}

impl CipherSuite {
    /// Every supported suite, in tag order.
    pub const ALL: [Self; 4] = [
        Self::AesGcm,
        Self::AesPmacSiv,
        Self::ChaCha20Poly1305,
        Self::XChaCha20Poly1305,
    ];

    fn cipher(self) -> &'static dyn Cipher {
        match self {
            Self::AesGcm => &AesGcmCipher,
            Self::AesPmacSiv => &AesPmacSivCipher,
            Self::ChaCha20Poly1305 => &ChaCha20Poly1305Cipher,
            Self::XChaCha20Poly1305 => &XChaCha20Poly1305Cipher,
        }
    }

    /// Resolve an envelope tag.
    pub fn from_tag(tag: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|suite| suite.tag() == tag)
            .ok_or_else(|| CryptoError::UnsupportedCipher(format!("tag {tag:#04x}")))
    }

    pub fn tag(self) -> u8 {
        self.cipher().tag()
    }

    /// Canonical name as used by key records, e.g. `"aes-gcm"`.
    pub fn name(self) -> &'static str {
        self.cipher().name()
    }

    pub fn key_len(self) -> usize {
        self.cipher().key_len()
    }

    pub fn nonce_len(self) -> usize {
        self.cipher().nonce_len()
    }

    pub fn nonce_policy(self) -> NoncePolicy {
        match self {
            Self::AesPmacSiv => NoncePolicy::Synthetic,
            Self::AesGcm | Self::ChaCha20Poly1305 | Self::XChaCha20Poly1305 => NoncePolicy::Random,
        }
    }

    /// Smallest envelope this suite can produce: tag byte, nonce, auth tag.
    pub fn min_envelope_len(self) -> usize {
        1 + self.nonce_len() + AUTH_TAG_LEN
    }

    /// Produce the nonce for one seal call according to the suite's policy.
    pub fn generate_nonce(self) -> Vec<u8> {
        let mut nonce = vec![0u8; self.nonce_len()];
        if self.nonce_policy() == NoncePolicy::Random {
            rand::rng().fill_bytes(&mut nonce);
        }
        nonce
    }

    /// Check that `secret` has the length this suite requires.
    pub fn check_key(self, secret: &[u8]) -> Result<()> {
        if secret.len() != self.key_len() {
            return Err(CryptoError::InvalidKeyLength {
                cipher: self.name(),
                expected: self.key_len(),
                actual: secret.len(),
            });
        }
        Ok(())
    }

    pub fn seal(self, key: &[u8], nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        self.cipher().seal(key, nonce, plaintext, aad)
    }

    pub fn open(self, key: &[u8], nonce: &[u8], sealed: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        self.cipher().open(key, nonce, sealed, aad)
    }
}

impl FromStr for CipherSuite {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|suite| suite.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CryptoError::UnsupportedCipher(wanted.to_string()))
    }
}

impl TryFrom<String> for CipherSuite {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CipherSuite> for String {
    fn from(suite: CipherSuite) -> Self {
        suite.name().to_string()
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
