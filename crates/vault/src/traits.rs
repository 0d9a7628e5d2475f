//! Traits shared by the cipher backends and the key types.

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::Result,
    marshal::{Codec, JsonCodec},
};

/// A single AEAD algorithm over a raw key and an explicit nonce.
///
/// Backends are stateless unit structs. The closed set of backends is
/// enumerated by [`CipherSuite`](crate::CipherSuite), which owns dispatch.
pub trait Cipher: Send + Sync {
    /// Wire tag written as the first byte of every envelope.
    fn tag(&self) -> u8;

    /// Canonical lowercase algorithm name used by key records.
    fn name(&self) -> &'static str;

    /// Required raw key length in bytes.
    fn key_len(&self) -> usize;

    /// Nonce length carried in the envelope (zero for synthetic-IV modes).
    fn nonce_len(&self) -> usize;

    /// Encrypt `plaintext`, authenticating `aad`. Returns `ciphertext || tag`.
    fn seal(&self, key: &[u8], nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>>;

    /// Reverse [`seal`](Self::seal). Any failure is
    /// [`AuthenticationFailed`](crate::CryptoError::AuthenticationFailed).
    fn open(&self, key: &[u8], nonce: &[u8], sealed: &[u8], aad: &[u8]) -> Result<Vec<u8>>;
}

/// Encrypt/decrypt capability shared by [`Key`](crate::Key),
/// [`CompositeKey`](crate::CompositeKey) and [`LoadedKey`](crate::LoadedKey).
///
/// `extra` is the ordered list of associated-data byte strings. The same
/// list, in the same order, must be supplied to decrypt.
pub trait SymmetricKey: Send + Sync {
    /// Identifier shared by every secret behind this key.
    fn identifier(&self) -> &str;

    /// Seal `plaintext` into a self-describing envelope.
    fn encrypt(&self, plaintext: &[u8], extra: &[&[u8]]) -> Result<Vec<u8>>;

    /// Open an envelope produced by [`encrypt`](Self::encrypt).
    fn decrypt(&self, envelope: &[u8], extra: &[&[u8]]) -> Result<Vec<u8>>;

    /// Serialize `value` with the JSON codec, then encrypt it.
    fn encrypt_marshal<T>(&self, value: &T, extra: &[&[u8]]) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
        Self: Sized,
    {
        self.encrypt_marshal_with(&JsonCodec, value, extra)
    }

    /// Decrypt an envelope and deserialize the plaintext with the JSON codec.
    fn decrypt_marshal<T>(&self, envelope: &[u8], extra: &[&[u8]]) -> Result<T>
    where
        T: DeserializeOwned,
        Self: Sized,
    {
        self.decrypt_marshal_with(&JsonCodec, envelope, extra)
    }

    /// Like [`decrypt_marshal`](Self::decrypt_marshal) but populates `target`
    /// in place. `target` is untouched on failure.
    fn decrypt_marshal_into<T>(&self, envelope: &[u8], target: &mut T, extra: &[&[u8]]) -> Result<()>
    where
        T: DeserializeOwned,
        Self: Sized,
    {
        *target = self.decrypt_marshal(envelope, extra)?;
        Ok(())
    }

    /// Serialize with an explicit codec, then encrypt.
    fn encrypt_marshal_with<C, T>(&self, codec: &C, value: &T, extra: &[&[u8]]) -> Result<Vec<u8>>
    where
        C: Codec,
        T: Serialize + ?Sized,
        Self: Sized,
    {
        let bytes = codec.encode(value)?;
        self.encrypt(&bytes, extra)
    }

    /// Decrypt, then deserialize with an explicit codec.
    fn decrypt_marshal_with<C, T>(&self, codec: &C, envelope: &[u8], extra: &[&[u8]]) -> Result<T>
    where
        C: Codec,
        T: DeserializeOwned,
        Self: Sized,
    {
        let plaintext = zeroize::Zeroizing::new(self.decrypt(envelope, extra)?);
        codec.decode(&plaintext)
    }
}
