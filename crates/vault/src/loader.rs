//! Turning key-source records into [`Key`]s and [`CompositeKey`]s.
//!
//! The key source is passed in explicitly; there is no process-wide
//! provider registry. Records sharing an identifier become one composite
//! key ordered by timestamp; a lone record becomes a bare key.

use std::{collections::BTreeMap, fmt, sync::Arc};

use {
    base64::Engine,
    zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing},
};

#[cfg(feature = "metrics")]
use strongbox_metrics::{counter, crypto as crypto_metrics};

use crate::{
    composite::CompositeKey,
    error::{CryptoError, Result},
    key::Key,
    suite::CipherSuite,
    traits::SymmetricKey,
};

/// One key record as supplied by the key source.
///
/// `key` is hex or standard base64. When `sealed` is set the decoded bytes
/// are handed to the loader's [`Unsealer`] before use.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct KeyRecord {
    pub key: String,
    pub identifier: String,
    #[serde(default)]
    pub sealed: bool,
    pub timestamp: i64,
    pub cipher: String,
}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("key", &"[REDACTED]")
            .field("identifier", &self.identifier)
            .field("sealed", &self.sealed)
            .field("timestamp", &self.timestamp)
            .field("cipher", &self.cipher)
            .finish()
    }
}

/// Supplier of key records (configuration files, environment, a secret
/// store...).
pub trait KeySource: Send + Sync {
    fn records(&self) -> Result<Vec<KeyRecord>>;
}

impl KeySource for Vec<KeyRecord> {
    fn records(&self) -> Result<Vec<KeyRecord>> {
        Ok(self.clone())
    }
}

impl<S: KeySource + ?Sized> KeySource for Arc<S> {
    fn records(&self) -> Result<Vec<KeyRecord>> {
        (**self).records()
    }
}

/// Recovers raw key bytes from at-rest protected (sealed) key material.
pub trait Unsealer: Send + Sync {
    fn unseal(&self, identifier: &str, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>>;
}

/// Decode a hex or standard base64 secret.
///
/// Hex wins when the text is valid hex, since hex strings are also valid
/// base64 alphabets.
pub fn decode_secret(text: &str) -> Result<Zeroizing<Vec<u8>>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CryptoError::InvalidKeyEncoding("empty key".to_string()));
    }
    if text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return hex::decode(text)
            .map(Zeroizing::new)
            .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(text)
        .map(Zeroizing::new)
        .map_err(|e| CryptoError::InvalidKeyEncoding(format!("neither hex nor base64: {e}")))
}

/// A key as loaded for one identifier.
#[derive(Debug, Clone)]
pub enum LoadedKey {
    Single(Key),
    Composite(CompositeKey),
}

impl LoadedKey {
    /// Group keys of one identifier: one key stays bare, more become a
    /// composite.
    pub fn from_keys(mut keys: Vec<Key>) -> Result<Self> {
        if keys.len() == 1 {
            if let Some(key) = keys.pop() {
                return Ok(Self::Single(key));
            }
        }
        CompositeKey::new(keys).map(Self::Composite)
    }

    /// The key used for encryption.
    pub fn current(&self) -> &Key {
        match self {
            Self::Single(key) => key,
            Self::Composite(comp) => comp.current(),
        }
    }

    /// All members in priority order.
    pub fn members(&self) -> &[Key] {
        match self {
            Self::Single(key) => std::slice::from_ref(key),
            Self::Composite(comp) => comp.keys(),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }
}

impl SymmetricKey for LoadedKey {
    fn identifier(&self) -> &str {
        self.current().identifier()
    }

    fn encrypt(&self, plaintext: &[u8], extra: &[&[u8]]) -> Result<Vec<u8>> {
        match self {
            Self::Single(key) => key.encrypt(plaintext, extra),
            Self::Composite(comp) => comp.encrypt(plaintext, extra),
        }
    }

    fn decrypt(&self, envelope: &[u8], extra: &[&[u8]]) -> Result<Vec<u8>> {
        match self {
            Self::Single(key) => key.decrypt(envelope, extra),
            Self::Composite(comp) => comp.decrypt(envelope, extra),
        }
    }
}

/// Every loaded identifier, immutable once built.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: BTreeMap<String, LoadedKey>,
}

impl KeySet {
    pub fn get(&self, identifier: &str) -> Option<&LoadedKey> {
        self.keys.get(identifier)
    }

    /// Like [`get`](Self::get) but reports a missing identifier as an error.
    pub fn key(&self, identifier: &str) -> Result<&LoadedKey> {
        self.get(identifier)
            .ok_or_else(|| CryptoError::KeyNotFound(identifier.to_string()))
    }

    /// Identifiers in lexical order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LoadedKey)> {
        self.keys.iter().map(|(id, key)| (id.as_str(), key))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Builds keys from a [`KeySource`], unsealing sealed records on the way.
#[derive(Clone)]
pub struct KeyLoader {
    source: Arc<dyn KeySource>,
    unsealer: Option<Arc<dyn Unsealer>>,
}

impl KeyLoader {
    pub fn new(source: impl KeySource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            unsealer: None,
        }
    }

    /// Attach the collaborator that unseals records flagged `sealed`.
    #[must_use]
    pub fn with_unsealer(mut self, unsealer: impl Unsealer + 'static) -> Self {
        self.unsealer = Some(Arc::new(unsealer));
        self
    }

    /// Load the key for `identifier`: bare for one record, composite for more.
    pub fn load_key(&self, identifier: &str) -> Result<LoadedKey> {
        let keys = self
            .source
            .records()?
            .iter()
            .filter(|record| record.identifier == identifier)
            .map(|record| self.build_key(record))
            .collect::<Result<Vec<_>>>()?;

        if keys.is_empty() {
            return Err(CryptoError::KeyNotFound(identifier.to_string()));
        }

        #[cfg(feature = "metrics")]
        counter!(crypto_metrics::KEY_LOADS_TOTAL).increment(1);

        LoadedKey::from_keys(keys)
    }

    /// Load only the current (newest) key for `identifier`.
    pub fn load_single_key(&self, identifier: &str) -> Result<Key> {
        Ok(self.load_key(identifier)?.current().clone())
    }

    /// Load every identifier the source knows about.
    ///
    /// Any bad record fails the whole load, so a reload never publishes a
    /// set that silently lost a key.
    pub fn load_all(&self) -> Result<KeySet> {
        let mut grouped: BTreeMap<String, Vec<Key>> = BTreeMap::new();
        for record in &self.source.records()? {
            let key = self.build_key(record)?;
            grouped
                .entry(record.identifier.clone())
                .or_default()
                .push(key);
        }

        let keys = grouped
            .into_iter()
            .map(|(id, keys)| LoadedKey::from_keys(keys).map(|key| (id, key)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        #[cfg(feature = "metrics")]
        counter!(crypto_metrics::KEY_LOADS_TOTAL).increment(keys.len() as u64);

        #[cfg(feature = "tracing")]
        tracing::debug!(identifiers = keys.len(), "key set loaded");

        Ok(KeySet { keys })
    }

    fn build_key(&self, record: &KeyRecord) -> Result<Key> {
        let suite: CipherSuite = record.cipher.parse()?;
        let mut secret = decode_secret(&record.key)?;

        if record.sealed {
            let unsealer = self
                .unsealer
                .as_ref()
                .ok_or_else(|| CryptoError::SealedKey(record.identifier.clone()))?;
            secret = unsealer.unseal(&record.identifier, &secret)?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            identifier = %record.identifier,
            cipher = %suite,
            timestamp = record.timestamp,
            sealed = record.sealed,
            "key loaded"
        );

        Key::new(
            record.identifier.clone(),
            record.timestamp,
            suite,
            secret.to_vec(),
        )
    }
}

impl fmt::Debug for KeyLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyLoader")
            .field("unsealer", &self.unsealer.is_some())
            .finish_non_exhaustive()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn record(identifier: &str, timestamp: i64, cipher: &str, key: &str) -> KeyRecord {
        KeyRecord {
            key: key.to_string(),
            identifier: identifier.to_string(),
            sealed: false,
            timestamp,
            cipher: cipher.to_string(),
        }
    }

    fn hex_key(fill: u8, len: usize) -> String {
        hex::encode(vec![fill; len])
    }

    struct XorUnsealer(u8);

    impl Unsealer for XorUnsealer {
        fn unseal(&self, _identifier: &str, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
            Ok(Zeroizing::new(sealed.iter().map(|b| b ^ self.0).collect()))
        }
    }

    #[test]
    fn decodes_hex_and_base64() {
        assert_eq!(*decode_secret("00ff").unwrap(), vec![0x00, 0xFF]);
        assert_eq!(*decode_secret("AP8=").unwrap(), vec![0x00, 0xFF]);
        assert!(matches!(
            decode_secret("not a key!"),
            Err(CryptoError::InvalidKeyEncoding(_))
        ));
        assert!(matches!(
            decode_secret("  "),
            Err(CryptoError::InvalidKeyEncoding(_))
        ));
    }

    #[test]
    fn lone_record_is_bare_key() {
        let loader = KeyLoader::new(vec![record("a", 1, "aes-gcm", &hex_key(1, 32))]);
        let key = loader.load_key("a").unwrap();
        assert!(!key.is_composite());
        assert_eq!(key.identifier(), "a");
    }

    #[test]
    fn shared_identifier_is_composite_newest_first() {
        let loader = KeyLoader::new(vec![
            record("c", 10, "aes-pmac-siv", &hex_key(1, 64)),
            record("other", 99, "aes-gcm", &hex_key(3, 32)),
            record("c", 20, "chacha20-poly1305", &hex_key(2, 32)),
        ]);
        let key = loader.load_key("c").unwrap();
        assert!(key.is_composite());
        assert_eq!(key.members().len(), 2);
        assert_eq!(key.current().suite(), CipherSuite::ChaCha20Poly1305);

        let single = loader.load_single_key("c").unwrap();
        assert_eq!(single.timestamp(), 20);
    }

    #[test]
    fn unknown_cipher_fails_at_load() {
        let loader = KeyLoader::new(vec![record("a", 1, "rot13", &hex_key(1, 32))]);
        assert!(matches!(
            loader.load_key("a"),
            Err(CryptoError::UnsupportedCipher(_))
        ));
        assert!(matches!(
            loader.load_all(),
            Err(CryptoError::UnsupportedCipher(_))
        ));
    }

    #[test]
    fn missing_identifier() {
        let loader = KeyLoader::new(Vec::<KeyRecord>::new());
        assert!(matches!(
            loader.load_key("nope"),
            Err(CryptoError::KeyNotFound(_))
        ));
    }

    #[test]
    fn sealed_record_needs_unsealer() {
        let mut rec = record("s", 1, "aes-gcm", &hex_key(0x0F, 32));
        rec.sealed = true;

        let loader = KeyLoader::new(vec![rec.clone()]);
        assert!(matches!(loader.load_key("s"), Err(CryptoError::SealedKey(_))));

        let unsealed = KeyLoader::new(vec![rec]).with_unsealer(XorUnsealer(0xFF));
        let key = unsealed.load_key("s").unwrap();
        let plain = Key::new("s", 1, CipherSuite::AesGcm, vec![0xF0; 32]).unwrap();
        let env = plain.encrypt(b"x", &[]).unwrap();
        assert_eq!(key.decrypt(&env, &[]).unwrap(), b"x");
    }

    #[test]
    fn load_all_groups_by_identifier() {
        let loader = KeyLoader::new(vec![
            record("b", 1, "aes-gcm", &hex_key(1, 32)),
            record("a", 1, "xchacha20-poly1305", &hex_key(2, 32)),
            record("b", 2, "aes-gcm", &hex_key(3, 32)),
        ]);
        let set = loader.load_all().unwrap();
        assert_eq!(set.identifiers().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(set.key("b").unwrap().is_composite());
        assert!(matches!(set.key("z"), Err(CryptoError::KeyNotFound(_))));
    }

    #[test]
    fn record_debug_redacts_key() {
        let rec = record("a", 1, "aes-gcm", "deadbeef");
        assert!(!format!("{rec:?}").contains("deadbeef"));
    }
}
