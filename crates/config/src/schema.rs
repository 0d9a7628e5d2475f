//! Key file schema.

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    strongbox_vault::KeyRecord,
};

/// Top-level key file: a list of key records.
///
/// ```toml
/// [[keys]]
/// identifier = "payments"
/// cipher = "aes-gcm"
/// timestamp = 1522325806
/// key = "${PAYMENTS_KEY}"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyFile {
    #[serde(default)]
    pub keys: Vec<KeyEntry>,
}

/// One key record as written in a key file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyEntry {
    /// Hex or base64 key material (sealed material when `sealed` is set).
    #[serde(serialize_with = "serialize_secret")]
    pub key: Secret<String>,
    pub identifier: String,
    #[serde(default)]
    pub sealed: bool,
    /// Creation or rotation time; newer keys take priority for encryption.
    pub timestamp: i64,
    /// Cipher suite name, e.g. `aes-gcm` or `chacha20-poly1305`.
    pub cipher: String,
}

impl KeyEntry {
    /// Convert to the record shape consumed by the vault loader.
    pub fn to_record(&self) -> KeyRecord {
        KeyRecord {
            key: self.key.expose_secret().clone(),
            identifier: self.identifier.clone(),
            sealed: self.sealed,
            timestamp: self.timestamp,
            cipher: self.cipher.clone(),
        }
    }
}

impl KeyFile {
    pub fn records(&self) -> Vec<KeyRecord> {
        self.keys.iter().map(KeyEntry::to_record).collect()
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
