//! Object codecs for the encrypt-then-serialize helpers on
//! [`SymmetricKey`](crate::SymmetricKey).

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{CryptoError, Result};

/// Structural encoding used by the marshal helpers.
///
/// Codec failures are reported as
/// [`Serialization`](CryptoError::Serialization), never as cipher errors.
pub trait Codec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON via `serde_json`. The default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(CryptoError::serialization)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(CryptoError::serialization)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::{Key, SymmetricKey, suite::CipherSuite};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Obfuscated {
        name: String,
        amount: i64,
    }

    fn origin() -> Obfuscated {
        Obfuscated {
            name: "test".to_string(),
            amount: 10,
        }
    }

    fn key() -> Key {
        Key::new("test", 1, CipherSuite::AesGcm, vec![0x5F; 32]).unwrap()
    }

    #[test]
    fn round_trip_into_target() {
        let key = key();
        let extra: [&[u8]; 2] = [b"aa", b"bb"];

        let plain = key.encrypt_marshal(&origin(), &[]).unwrap();
        let with_extra = key.encrypt_marshal(&origin(), &extra).unwrap();

        let mut target = Obfuscated::default();
        key.decrypt_marshal_into(&plain, &mut target, &[]).unwrap();
        assert_eq!(target, origin());

        let mut target_extra = Obfuscated::default();
        key.decrypt_marshal_into(&with_extra, &mut target_extra, &extra)
            .unwrap();
        assert_eq!(target_extra, origin());
    }

    #[test]
    fn missing_extra_fails_and_leaves_target_alone() {
        let key = key();
        let extra: [&[u8]; 2] = [b"aa", b"bb"];
        let env = key.encrypt_marshal(&origin(), &extra).unwrap();

        let mut target = Obfuscated::default();
        let result = key.decrypt_marshal_into(&env, &mut target, &[]);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
        assert_eq!(target, Obfuscated::default());
    }

    #[test]
    fn codec_failure_is_serialization_error() {
        let key = key();
        let env = key.encrypt(b"not json", &[]).unwrap();
        let result: Result<Obfuscated> = key.decrypt_marshal(&env, &[]);
        assert!(matches!(result, Err(CryptoError::Serialization(_))));
    }

    #[test]
    fn returns_new_value() {
        let key = key();
        let env = key.encrypt_marshal(&origin(), &[]).unwrap();
        let value: Obfuscated = key.decrypt_marshal(&env, &[]).unwrap();
        assert_eq!(value, origin());
    }
}
