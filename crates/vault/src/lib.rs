//! Symmetric encryption under named, rotatable keys.
//!
//! A [`Key`] binds one secret to one [`CipherSuite`]. A [`CompositeKey`]
//! groups every generation of a key: the newest encrypts, all of them are
//! tried on decrypt. Ciphertexts are self-describing envelopes
//! (`[tag][nonce][ciphertext || auth tag]`) so the decrypting side never
//! needs to be told which algorithm or which generation sealed them.
//!
//! Associated data ("extra") is an ordered list of byte strings that must
//! be supplied identically on both sides.
//!
//! # Example
//!
//! ```rust,ignore
//! use strongbox_vault::{KeyLoader, SymmetricKey};
//!
//! let loader = KeyLoader::new(records);
//! let key = loader.load_key("payments")?;
//! let sealed = key.encrypt(b"card", &[b"customer-42"])?;
//! let card = key.decrypt(&sealed, &[b"customer-42"])?;
//! ```

pub mod aad;
pub mod aes_gcm;
pub mod aes_pmac_siv;
pub mod chacha20;
pub mod composite;
pub mod envelope;
pub mod error;
pub mod key;
pub mod loader;
pub mod marshal;
pub mod ring;
pub mod suite;
pub mod traits;
pub mod xchacha20;

pub use {
    composite::CompositeKey,
    envelope::Envelope,
    error::{CryptoError, Result},
    key::Key,
    loader::{KeyLoader, KeyRecord, KeySet, KeySource, LoadedKey, Unsealer, decode_secret},
    marshal::{Codec, JsonCodec},
    ring::KeyRing,
    suite::{CipherSuite, NoncePolicy},
    traits::{Cipher, SymmetricKey},
};
