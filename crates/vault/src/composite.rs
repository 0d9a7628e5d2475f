//! Rotation-aware aggregate of keys sharing one identifier.

#[cfg(feature = "metrics")]
use strongbox_metrics::{counter, crypto as crypto_metrics};

use crate::{
    envelope::Envelope,
    error::{CryptoError, Result},
    key::Key,
    traits::SymmetricKey,
};

/// Keys sharing one identifier, newest first.
///
/// Encryption always uses the current (newest) member. Decryption tries
/// every member in priority order and returns the first success, so data
/// sealed under a retired key stays readable until that key is dropped
/// from the source.
#[derive(Debug, Clone)]
pub struct CompositeKey {
    keys: Vec<Key>,
}

impl CompositeKey {
    /// Build from members in any order; they are ordered by timestamp,
    /// newest first. Equal timestamps keep their input order.
    pub fn new(mut keys: Vec<Key>) -> Result<Self> {
        let Some(first) = keys.first() else {
            return Err(CryptoError::InvalidKeySet(
                "composite key needs at least one member".to_string(),
            ));
        };

        let identifier = first.identifier().to_string();
        if let Some(stray) = keys.iter().find(|k| k.identifier() != identifier) {
            return Err(CryptoError::InvalidKeySet(format!(
                "mixed identifiers: {identifier} and {}",
                stray.identifier()
            )));
        }

        keys.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            identifier = %identifier,
            members = keys.len(),
            current = %keys[0].suite(),
            "composite key built"
        );

        Ok(Self { keys })
    }

    /// The member used for encryption.
    pub fn current(&self) -> &Key {
        &self.keys[0]
    }

    /// Members in priority order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Never true for a constructed key.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl SymmetricKey for CompositeKey {
    fn identifier(&self) -> &str {
        self.current().identifier()
    }

    fn encrypt(&self, plaintext: &[u8], extra: &[&[u8]]) -> Result<Vec<u8>> {
        self.current().encrypt(plaintext, extra)
    }

    fn decrypt(&self, envelope: &[u8], extra: &[&[u8]]) -> Result<Vec<u8>> {
        let env = Envelope::decode(envelope)?;

        for (position, key) in self.keys.iter().enumerate() {
            let Ok(plaintext) = key.open_envelope(&env, extra) else {
                continue;
            };

            if position > 0 {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    identifier = %self.identifier(),
                    position,
                    "decrypted with a rotated-out key"
                );
                #[cfg(feature = "metrics")]
                counter!(crypto_metrics::COMPOSITE_FALLBACKS_TOTAL).increment(1);
            }

            #[cfg(feature = "metrics")]
            counter!(crypto_metrics::DECRYPTIONS_TOTAL, "cipher" => key.suite().name())
                .increment(1);

            return Ok(plaintext);
        }

        #[cfg(feature = "metrics")]
        counter!(crypto_metrics::DECRYPTION_FAILURES_TOTAL, "cipher" => env.suite.name())
            .increment(1);

        Err(CryptoError::AuthenticationFailed)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::CipherSuite;

    fn key(identifier: &str, timestamp: i64, suite: CipherSuite, fill: u8) -> Key {
        Key::new(identifier, timestamp, suite, vec![fill; suite.key_len()]).unwrap()
    }

    fn rotated() -> (CompositeKey, Key, Key) {
        let old = key("c", 100, CipherSuite::AesPmacSiv, 0x01);
        let new = key("c", 200, CipherSuite::ChaCha20Poly1305, 0x02);
        let comp = CompositeKey::new(vec![old.clone(), new.clone()]).unwrap();
        (comp, new, old)
    }

    #[test]
    fn members_are_ordered_newest_first() {
        let (comp, new, old) = rotated();
        assert_eq!(comp.len(), 2);
        assert_eq!(comp.keys()[0].timestamp(), new.timestamp());
        assert_eq!(comp.keys()[1].timestamp(), old.timestamp());
        assert_eq!(comp.current().suite(), CipherSuite::ChaCha20Poly1305);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let a = key("c", 5, CipherSuite::AesGcm, 0x0A);
        let b = key("c", 5, CipherSuite::XChaCha20Poly1305, 0x0B);
        let comp = CompositeKey::new(vec![a, b]).unwrap();
        assert_eq!(comp.current().suite(), CipherSuite::AesGcm);
    }

    #[test]
    fn encrypts_with_current_only() {
        let (comp, new, old) = rotated();
        let env = comp.encrypt(b"eoeodecrytp", &[]).unwrap();

        assert_eq!(comp.decrypt(&env, &[]).unwrap(), b"eoeodecrytp");
        assert_eq!(new.decrypt(&env, &[]).unwrap(), b"eoeodecrytp");
        assert!(matches!(
            old.decrypt(&env, &[]),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn decrypts_legacy_envelopes() {
        let (comp, _new, old) = rotated();
        let env = old.encrypt(b"legacy", &[]).unwrap();
        assert_eq!(comp.decrypt(&env, &[]).unwrap(), b"legacy");
    }

    #[test]
    fn same_suite_rotation_falls_through() {
        let old = key("c", 1, CipherSuite::AesGcm, 0x01);
        let new = key("c", 2, CipherSuite::AesGcm, 0x02);
        let comp = CompositeKey::new(vec![new, old.clone()]).unwrap();
        let env = old.encrypt(b"legacy", &[]).unwrap();
        assert_eq!(comp.decrypt(&env, &[]).unwrap(), b"legacy");
    }

    #[test]
    fn exhausted_members_report_authentication_failure() {
        let (comp, _, _) = rotated();
        let stranger = key("c", 300, CipherSuite::AesGcm, 0x09);
        let env = stranger.encrypt(b"nope", &[]).unwrap();
        assert!(matches!(
            comp.decrypt(&env, &[]),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn structural_errors_surface_directly() {
        let (comp, _, _) = rotated();
        assert!(matches!(
            comp.decrypt(&[], &[]),
            Err(CryptoError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            comp.decrypt(&[0xAB; 64], &[]),
            Err(CryptoError::UnsupportedCipher(_))
        ));
    }

    #[test]
    fn empty_set_is_rejected() {
        assert!(matches!(
            CompositeKey::new(vec![]),
            Err(CryptoError::InvalidKeySet(_))
        ));
    }

    #[test]
    fn mixed_identifiers_are_rejected() {
        let a = key("a", 1, CipherSuite::AesGcm, 0x01);
        let b = key("b", 2, CipherSuite::AesGcm, 0x02);
        assert!(matches!(
            CompositeKey::new(vec![a, b]),
            Err(CryptoError::InvalidKeySet(_))
        ));
    }
}
