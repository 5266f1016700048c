use docseal_crypto::{
    CipherEnvelope, CryptoError, FORMAT_VERSION, KeyMaterial, MAC_LEN, MacEnvelope,
};

#[test]
fn cipher_envelope_roundtrip() {
    let envelope = CipherEnvelope::new([9u8; 16], vec![1, 2, 3, 4]);
    let bytes = envelope.encode();
    assert_eq!(bytes[0], FORMAT_VERSION);
    assert_eq!(bytes.len(), 1 + 16 + 4);

    let decoded = CipherEnvelope::decode(&bytes).unwrap();
    assert_eq!(decoded, envelope);
}

#[test]
fn cipher_envelope_accepts_empty_ciphertext_body() {
    // 17 bytes is the floor: version + iv, nothing else
    let bytes = CipherEnvelope::new([0u8; 16], vec![]).encode();
    assert_eq!(bytes.len(), 17);
    assert!(CipherEnvelope::decode(&bytes).is_ok());
}

#[test]
fn cipher_envelope_rejects_short_input() {
    let err = CipherEnvelope::decode(&[FORMAT_VERSION; 16]).unwrap_err();
    assert!(matches!(err, CryptoError::CiphertextTooShort { len: 16 }));
}

#[test]
fn mac_envelope_roundtrip() {
    let fields = vec!["_id".to_string(), "_ct".to_string(), "flag".to_string()];
    let envelope = MacEnvelope::new([3u8; MAC_LEN], fields.clone());
    let bytes = envelope.encode().unwrap();
    assert_eq!(bytes[0], FORMAT_VERSION);

    let decoded = MacEnvelope::decode(&bytes).unwrap();
    assert_eq!(decoded.version, FORMAT_VERSION);
    assert_eq!(decoded.mac, [3u8; MAC_LEN]);
    assert_eq!(decoded.fields, fields);
}

#[test]
fn mac_envelope_minimum_is_version_mac_and_empty_list() {
    let bytes = MacEnvelope::new([0u8; MAC_LEN], vec![]).encode().unwrap();
    assert_eq!(bytes.len(), MacEnvelope::MIN_LEN);
    assert_eq!(&bytes[1 + MAC_LEN..], b"[]");
    assert!(MacEnvelope::decode(&bytes).is_ok());
}

#[test]
fn mac_envelope_rejects_truncated_input() {
    let bytes = MacEnvelope::new([0u8; MAC_LEN], vec!["_id".into(), "_ct".into()])
        .encode()
        .unwrap();
    let err = MacEnvelope::decode(&bytes[..MacEnvelope::MIN_LEN - 1]).unwrap_err();
    assert!(matches!(err, CryptoError::AuthCodeTooShort));
}

#[test]
fn mac_envelope_rejects_garbled_field_list() {
    let mut bytes = MacEnvelope::new([0u8; MAC_LEN], vec!["_id".into(), "_ct".into()])
        .encode()
        .unwrap();
    let last = bytes.len() - 1;
    bytes[last] = b'{';
    let err = MacEnvelope::decode(&bytes).unwrap_err();
    assert!(matches!(err, CryptoError::AuthCodeFieldList));
}

#[test]
fn key_material_base64_validation() {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    let enc = STANDARD.encode([1u8; 32]);
    let sig = STANDARD.encode([2u8; 64]);
    assert!(KeyMaterial::from_base64(&enc, &sig).is_ok());

    let short_enc = STANDARD.encode([1u8; 31]);
    assert!(matches!(
        KeyMaterial::from_base64(&short_enc, &sig).unwrap_err(),
        CryptoError::InvalidKeyLength { expected: 32, actual: 31 }
    ));

    let short_sig = STANDARD.encode([2u8; 63]);
    assert!(matches!(
        KeyMaterial::from_base64(&enc, &short_sig).unwrap_err(),
        CryptoError::InvalidKeyLength { expected: 64, actual: 63 }
    ));

    assert!(matches!(
        KeyMaterial::from_base64("not base64!!!", &sig).unwrap_err(),
        CryptoError::KeyEncoding(_)
    ));
}

#[test]
fn canonical_json_sorts_object_keys() {
    // The MAC payload depends on this: serde_json maps are BTreeMap-backed,
    // so key order in the source never leaks into the serialization.
    let a: serde_json::Value = serde_json::from_str(r#"{"b":1,"a":2}"#).unwrap();
    let b: serde_json::Value = serde_json::from_str(r#"{"a":2,"b":1}"#).unwrap();
    assert_eq!(serde_json::to_string(&a).unwrap(), r#"{"a":2,"b":1}"#);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
