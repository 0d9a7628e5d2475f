//! A single named secret bound to one cipher suite.

use std::fmt;

use zeroize::Zeroizing;

#[cfg(feature = "metrics")]
use strongbox_metrics::{counter, crypto as crypto_metrics};

use crate::{
    aad,
    envelope::{self, Envelope},
    error::{CryptoError, Result},
    suite::CipherSuite,
    traits::SymmetricKey,
};

/// One secret, one suite, plus identity and rotation metadata.
///
/// Immutable once built: rotating means building a new `Key`. The secret is
/// zeroized on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct Key {
    identifier: String,
    timestamp: i64,
    suite: CipherSuite,
    secret: Zeroizing<Vec<u8>>,
}

impl Key {
    /// Build a key, validating the secret length against `suite`.
    pub fn new(
        identifier: impl Into<String>,
        timestamp: i64,
        suite: CipherSuite,
        secret: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        let secret = Zeroizing::new(secret.into());
        suite.check_key(&secret)?;
        Ok(Self {
            identifier: identifier.into(),
            timestamp,
            suite,
            secret,
        })
    }

    /// Creation or rotation time reported by the key source.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    /// Open an already decoded envelope with this key.
    ///
    /// A bare key never tries another suite: a foreign tag is an
    /// authentication failure, not a reason to guess.
    pub(crate) fn open_envelope(&self, envelope: &Envelope<'_>, extra: &[&[u8]]) -> Result<Vec<u8>> {
        if envelope.suite != self.suite {
            return Err(CryptoError::AuthenticationFailed);
        }
        self.suite.open(
            &self.secret,
            envelope.nonce,
            envelope.sealed,
            &aad::frame(extra),
        )
    }
}

impl SymmetricKey for Key {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn encrypt(&self, plaintext: &[u8], extra: &[&[u8]]) -> Result<Vec<u8>> {
        let nonce = self.suite.generate_nonce();
        let sealed = self
            .suite
            .seal(&self.secret, &nonce, plaintext, &aad::frame(extra))?;

        #[cfg(feature = "metrics")]
        counter!(crypto_metrics::ENCRYPTIONS_TOTAL, "cipher" => self.suite.name()).increment(1);

        Ok(envelope::encode(self.suite, &nonce, &sealed))
    }

    fn decrypt(&self, envelope: &[u8], extra: &[&[u8]]) -> Result<Vec<u8>> {
        let result = Envelope::decode(envelope).and_then(|env| self.open_envelope(&env, extra));

        #[cfg(feature = "metrics")]
        match &result {
            Ok(_) => counter!(crypto_metrics::DECRYPTIONS_TOTAL, "cipher" => self.suite.name())
                .increment(1),
            Err(_) => counter!(
                crypto_metrics::DECRYPTION_FAILURES_TOTAL,
                "cipher" => self.suite.name()
            )
            .increment(1),
        }

        result
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("identifier", &self.identifier)
            .field("timestamp", &self.timestamp)
            .field("suite", &self.suite)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
