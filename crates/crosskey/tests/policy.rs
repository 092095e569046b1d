//! Default selection, input-validation rejections, and classification
//! behavior at the operation surface.

use crosskey::{
    classify, CoreError, CryptoAlgorithm, CryptoSuite, HashAlgorithm, KeyOptions, KeyRepr,
    ProtoError,
};

fn suite() -> CryptoSuite {
    CryptoSuite::default()
}

#[tokio::test]
async fn multikey_signing_defaults_to_base58_multibase() {
    let suite = suite();
    let mk = suite
        .generate_keys_mk(CryptoAlgorithm::Eddsa, &KeyOptions::default())
        .await
        .unwrap();

    let signature = suite
        .sign("default options", &KeyRepr::from(mk), None)
        .await
        .unwrap();
    assert!(signature.starts_with('z'));
}

#[tokio::test]
async fn jwk_signing_defaults_to_plain_base64() {
    let suite = suite();
    let keys = suite
        .generate_keys_jwk(CryptoAlgorithm::Eddsa, &KeyOptions::default())
        .await
        .unwrap();

    let input = KeyRepr::from(keys);
    let signature = suite.sign("default options", &input, None).await.unwrap();

    // No multibase indicator: 64 signature bytes come out as exactly 86
    // base64url characters (a multibase frame would add an 87th).
    assert_eq!(signature.len(), 86);
    assert!(suite
        .verify("default options", &signature, &input, None)
        .await
        .unwrap());

    // A different pair must not verify it.
    let other = suite
        .generate_keys_jwk(CryptoAlgorithm::Eddsa, &KeyOptions::default())
        .await
        .unwrap();
    assert!(!suite
        .verify("default options", &signature, &KeyRepr::from(other), None)
        .await
        .unwrap());
}

#[tokio::test]
async fn multikey_generation_rejects_rsa() {
    let suite = suite();
    let err = suite
        .generate_keys_mk(CryptoAlgorithm::RsaPss, &KeyOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProtoError::NoMultikeyForRsa));

    let err = suite
        .generate_keys_mk(CryptoAlgorithm::RsaOaep, &KeyOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProtoError::NoMultikeyForRsa));
}

#[tokio::test]
async fn encryption_rejects_multikey_flavored_keys() {
    let suite = suite();
    let mk = suite
        .generate_keys_mk(CryptoAlgorithm::Eddsa, &KeyOptions::default())
        .await
        .unwrap();

    let public = KeyRepr::from(mk.public_key_multibase.clone());
    let err = suite.encrypt("secret", &public, None).await.unwrap_err();
    assert!(matches!(err, ProtoError::MultikeyForEncryption));

    let err = suite
        .decrypt("zabc", &KeyRepr::from(mk), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ProtoError::MultikeyForEncryption));
}

#[tokio::test]
async fn modulus_length_is_ignored_where_irrelevant() {
    let suite = suite();
    let odd = KeyOptions { modulus_length: Some(999), ..Default::default() };

    // Irrelevant to ecdsa: not an error.
    assert!(suite.generate_keys(CryptoAlgorithm::Ecdsa, &odd).await.is_ok());

    // For RSA it is a hard input-validation error, raised before the engine.
    let err = suite.generate_keys(CryptoAlgorithm::RsaPss, &odd).await.unwrap_err();
    assert!(matches!(
        err,
        ProtoError::Core(CoreError::InvalidModulusLength(999))
    ));
}

#[tokio::test]
async fn classifier_is_idempotent_over_generated_jwk_pairs() {
    let suite = suite();
    let keys = suite
        .generate_keys_jwk(CryptoAlgorithm::Eddsa, &KeyOptions::default())
        .await
        .unwrap();

    let value = serde_json::to_value(&keys).unwrap();
    assert!(matches!(classify(&value).unwrap(), KeyRepr::JwkPair(_)));
}

#[tokio::test]
async fn classifier_recognizes_generated_multikeys_and_canonical_pairs() {
    let suite = suite();

    let mk = suite
        .generate_keys_mk(CryptoAlgorithm::Ecdsa, &KeyOptions::default())
        .await
        .unwrap();
    let value = serde_json::to_value(&mk).unwrap();
    assert!(matches!(classify(&value).unwrap(), KeyRepr::Multikey(_)));

    let pair = suite
        .generate_keys(CryptoAlgorithm::Eddsa, &KeyOptions::default())
        .await
        .unwrap();
    let value = serde_json::to_value(&pair).unwrap();
    assert!(matches!(classify(&value).unwrap(), KeyRepr::CanonicalPair(_)));
}

#[tokio::test]
async fn hash_hex_digests() {
    let suite = suite();

    let h256 = suite.hash("hello", None).await.unwrap();
    assert_eq!(
        h256,
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );

    let h384 = suite.hash("hello", Some(HashAlgorithm::Sha384)).await.unwrap();
    assert_eq!(h384.len(), 96);
    assert_ne!(h384[..32], h256[..32]);
}
