#![allow(clippy::unwrap_used, clippy::expect_used)]
use {
    serde::{Deserialize, Serialize},
    strongbox_vault::{CipherSuite, CryptoError, KeyLoader, KeyRecord, LoadedKey, SymmetricKey},
};

const TEXT: &[u8] = b"eoeodecrytp";
const EXTRA: [&[u8]; 2] = [b"aa", b"bb"];

fn record(identifier: &str, timestamp: i64, cipher: &str, key: &str) -> KeyRecord {
    KeyRecord {
        key: key.to_string(),
        identifier: identifier.to_string(),
        sealed: false,
        timestamp,
        cipher: cipher.to_string(),
    }
}

fn loader() -> KeyLoader {
    KeyLoader::new(vec![
        record(
            "test",
            1522325806,
            "aes-gcm",
            "5fdb8af280b007a46553dfddb3f42bc10619dcabca8d4fdf5239b09445ab1a41",
        ),
        record(
            "test-composite",
            1522325758,
            "aes-pmac-siv",
            "7db2b4b695e11563edca94b0f9c7ad16919fc11eac414c1b1706cbaa3c3e61a4b884301ae4e8fbedcc4f000b9c52904f13ea9456379d373524dea7fef79b39f7",
        ),
        record(
            "test-composite",
            1522325802,
            "chacha20-poly1305",
            "95371d0966180e05a67aa132669001061b57d423aeec83c49d18d32347e3d335",
        ),
    ])
}

#[test]
fn encrypt_decrypt_with_and_without_extra() {
    let k = loader().load_key("test").unwrap();

    let encr = k.encrypt(TEXT, &[]).unwrap();
    let encr_extra = k.encrypt(TEXT, &EXTRA).unwrap();
    assert_ne!(encr, encr_extra);

    assert_eq!(k.decrypt(&encr, &[]).unwrap(), TEXT);
    assert_eq!(k.decrypt(&encr_extra, &EXTRA).unwrap(), TEXT);

    assert!(matches!(
        k.decrypt(&encr_extra, &[]),
        Err(CryptoError::AuthenticationFailed)
    ));
    let wrong: [&[u8]; 2] = [b"cc", b"dd"];
    assert!(matches!(
        k.decrypt(&encr_extra, &wrong),
        Err(CryptoError::AuthenticationFailed)
    ));
    assert!(matches!(
        k.decrypt(&encr, &EXTRA),
        Err(CryptoError::AuthenticationFailed)
    ));
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct TestObfuscate {
    name: String,
    amount: i32,
}

#[test]
fn encrypt_decrypt_marshal() {
    let k = loader().load_key("test").unwrap();
    let origin = TestObfuscate {
        name: "test".to_string(),
        amount: 10,
    };

    let r = k.encrypt_marshal(&origin, &[]).unwrap();
    let r_extra = k.encrypt_marshal(&origin, &EXTRA).unwrap();

    let mut target = TestObfuscate::default();
    let mut target_extra = TestObfuscate::default();
    k.decrypt_marshal_into(&r, &mut target, &[]).unwrap();
    k.decrypt_marshal_into(&r_extra, &mut target_extra, &EXTRA)
        .unwrap();

    assert!(k.decrypt_marshal_into(&r_extra, &mut target_extra, &[]).is_err());

    assert_eq!(target, origin);
    assert_eq!(target_extra, origin);
}

#[test]
fn composite_key_rotation() {
    let kc = loader().load_key("test-composite").unwrap();
    let LoadedKey::Composite(ref comp) = kc else {
        panic!("expected a composite key instance");
    };
    assert_eq!(comp.len(), 2);

    let k = &comp.keys()[0];
    let k2 = &comp.keys()[1];
    assert_eq!(k.suite(), CipherSuite::ChaCha20Poly1305);
    assert_eq!(k2.suite(), CipherSuite::AesPmacSiv);

    let encr = kc.encrypt(TEXT, &[]).unwrap();
    assert_eq!(kc.decrypt(&encr, &[]).unwrap(), TEXT);
    assert_eq!(k.decrypt(&encr, &[]).unwrap(), TEXT);
    assert!(
        k2.decrypt(&encr, &[]).is_err(),
        "low-priority key must not decrypt the composite's output"
    );

    let encr2 = k2.encrypt(TEXT, &[]).unwrap();
    assert_eq!(kc.decrypt(&encr2, &[]).unwrap(), TEXT);

    let encr3 = k.encrypt(TEXT, &EXTRA).unwrap();
    assert_eq!(kc.decrypt(&encr3, &EXTRA).unwrap(), TEXT);
    assert!(matches!(
        kc.decrypt(&encr3, &[]),
        Err(CryptoError::AuthenticationFailed)
    ));
}

#[test]
fn legacy_siv_envelope_with_extra_still_opens() {
    let kc = loader().load_key("test-composite").unwrap();
    let old = &kc.members()[1];
    let env = old.encrypt(TEXT, &EXTRA).unwrap();
    assert_eq!(kc.decrypt(&env, &EXTRA).unwrap(), TEXT);
    assert!(kc.decrypt(&env, &[]).is_err());
}

#[test]
fn envelopes_are_portable_across_loads() {
    let first = loader().load_key("test").unwrap();
    let env = first.encrypt(TEXT, &EXTRA).unwrap();

    let second = loader().load_key("test").unwrap();
    assert_eq!(second.decrypt(&env, &EXTRA).unwrap(), TEXT);
}

#[test]
fn load_all_exposes_both_identifiers() {
    let set = loader().load_all().unwrap();
    assert_eq!(set.len(), 2);
    assert!(!set.key("test").unwrap().is_composite());
    assert!(set.key("test-composite").unwrap().is_composite());
}
