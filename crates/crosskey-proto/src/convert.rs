//! The key normalizer: every portable representation down to the canonical
//! key (or pair) an operation needs, with the usage intent supplied by the
//! operation itself.

use crate::error::{ProtoError, ProtoResult};
use crate::multikey;
use crate::repr::KeyRepr;
use crosskey_core::{
    CanonicalKey, CanonicalKeyPair, CryptoEngine, HashAlgorithm, ImportParams, Jwk, JwkPair,
    KeyUsage, NamedCurve,
};

/// Derive the engine import parameters from a JWK's declared key type and,
/// for RSA, its algorithm suffix.
///
/// RSA JWKs distinguish the PSS and OAEP families and their hash strength
/// through `alg`; an RSA JWK without a recognized `alg` imports as
/// PSS/SHA-256. EC JWKs default to P-256 when `crv` is absent.
pub fn import_params_for_jwk(jwk: &Jwk) -> ProtoResult<ImportParams> {
    match jwk.kty.as_deref() {
        Some("RSA") => Ok(match jwk.alg.as_deref() {
            Some("RSA-OAEP-384") => ImportParams::RsaOaep { hash: HashAlgorithm::Sha384 },
            Some("RSA-OAEP-256") => ImportParams::RsaOaep { hash: HashAlgorithm::Sha256 },
            Some("PS384") => ImportParams::RsaPss { hash: HashAlgorithm::Sha384 },
            _ => ImportParams::RsaPss { hash: HashAlgorithm::Sha256 },
        }),
        Some("EC") => {
            let curve = match jwk.crv.as_deref() {
                Some(crv) => crv.parse::<NamedCurve>()?,
                None => NamedCurve::P256,
            };
            Ok(ImportParams::Ecdsa { curve })
        }
        Some("OKP") => Ok(ImportParams::Eddsa),
        Some(other) => Err(ProtoError::UnknownKeyType(other.to_string())),
        None => Err(ProtoError::UnknownKeyType("<missing>".to_string())),
    }
}

/// Import a single JWK through the engine with the given usage intent.
pub async fn jwk_to_canonical<E: CryptoEngine>(
    engine: &E,
    jwk: &Jwk,
    usages: &[KeyUsage],
) -> ProtoResult<CanonicalKey> {
    let params = import_params_for_jwk(jwk)?;
    Ok(engine.import_jwk(jwk, params, true, usages).await?)
}

fn pair_usages(pair: &JwkPair) -> (KeyUsage, KeyUsage) {
    let is_oaep = |jwk: &Jwk| jwk.alg.as_deref().is_some_and(|a| a.starts_with("RSA-OAEP"));
    let public = if is_oaep(&pair.public) { KeyUsage::Encrypt } else { KeyUsage::Verify };
    let secret = if is_oaep(&pair.secret) { KeyUsage::Decrypt } else { KeyUsage::Sign };
    (public, secret)
}

/// Import a JWK pair. The usage intent of each half follows the pair's
/// algorithm: OAEP pairs get encrypt/decrypt, everything else verify/sign.
/// Both halves must land in the same algorithm family.
pub async fn jwk_pair_to_canonical<E: CryptoEngine>(
    engine: &E,
    pair: &JwkPair,
) -> ProtoResult<CanonicalKeyPair> {
    let (public_usage, secret_usage) = pair_usages(pair);
    let public = jwk_to_canonical(engine, &pair.public, &[public_usage]).await?;
    let secret = jwk_to_canonical(engine, &pair.secret, &[secret_usage]).await?;
    Ok(CanonicalKeyPair::new(public, secret)?)
}

/// Export a canonical key to its JWK form.
pub async fn canonical_to_jwk<E: CryptoEngine>(
    engine: &E,
    key: &CanonicalKey,
) -> ProtoResult<Jwk> {
    Ok(engine.export_jwk(key).await?)
}

/// Export a canonical pair to a JWK pair.
pub async fn pair_to_jwk<E: CryptoEngine>(
    engine: &E,
    pair: &CanonicalKeyPair,
) -> ProtoResult<JwkPair> {
    Ok(JwkPair {
        public: engine.export_jwk(&pair.public).await?,
        secret: engine.export_jwk(&pair.secret).await?,
    })
}

/// Normalize any representation to the secret key a sign/decrypt operation
/// uses. A bare multibase string is not accepted: the secret half alone does
/// not carry enough information.
pub async fn normalize_secret<E: CryptoEngine>(
    engine: &E,
    input: &KeyRepr,
) -> ProtoResult<CanonicalKey> {
    match input {
        KeyRepr::CanonicalPair(pair) => Ok(pair.secret.clone()),
        KeyRepr::Canonical(key) => Ok(key.clone()),
        KeyRepr::Multikey(mk) => Ok(multikey::from_multikey(mk)?.secret),
        KeyRepr::Multibase(_) => Err(ProtoError::MultibaseSecretKey),
        KeyRepr::JwkPair(pair) => Ok(jwk_pair_to_canonical(engine, pair).await?.secret),
        KeyRepr::Jwk(jwk) => {
            let usage = if jwk.alg.as_deref().is_some_and(|a| a.starts_with("RSA-OAEP")) {
                KeyUsage::Decrypt
            } else {
                KeyUsage::Sign
            };
            jwk_to_canonical(engine, jwk, &[usage]).await
        }
    }
}

/// Normalize any representation to the public key a verify/encrypt operation
/// uses.
pub async fn normalize_public<E: CryptoEngine>(
    engine: &E,
    input: &KeyRepr,
) -> ProtoResult<CanonicalKey> {
    match input {
        KeyRepr::CanonicalPair(pair) => Ok(pair.public.clone()),
        KeyRepr::Canonical(key) => Ok(key.clone()),
        KeyRepr::Multikey(mk) => multikey::public_from_multibase(&mk.public_key_multibase),
        KeyRepr::Multibase(mb) => multikey::public_from_multibase(mb),
        KeyRepr::JwkPair(pair) => Ok(jwk_pair_to_canonical(engine, pair).await?.public),
        KeyRepr::Jwk(jwk) => {
            let usage = if jwk.alg.as_deref().is_some_and(|a| a.starts_with("RSA-OAEP")) {
                KeyUsage::Encrypt
            } else {
                KeyUsage::Verify
            };
            jwk_to_canonical(engine, jwk, &[usage]).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosskey_core::{KeyAlgorithm, RustCryptoEngine};

    fn jwk(kty: &str, alg: Option<&str>, crv: Option<&str>) -> Jwk {
        Jwk {
            kty: Some(kty.into()),
            alg: alg.map(Into::into),
            crv: crv.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn rsa_import_params_follow_alg_suffix() {
        let cases = [
            (Some("RSA-OAEP-384"), ImportParams::RsaOaep { hash: HashAlgorithm::Sha384 }),
            (Some("RSA-OAEP-256"), ImportParams::RsaOaep { hash: HashAlgorithm::Sha256 }),
            (Some("PS384"), ImportParams::RsaPss { hash: HashAlgorithm::Sha384 }),
            (Some("PS256"), ImportParams::RsaPss { hash: HashAlgorithm::Sha256 }),
            // No recognized alg: signature import, SHA-256.
            (None, ImportParams::RsaPss { hash: HashAlgorithm::Sha256 }),
        ];
        for (alg, expected) in cases {
            assert_eq!(import_params_for_jwk(&jwk("RSA", alg, None)).unwrap(), expected);
        }
    }

    #[test]
    fn ec_and_okp_import_params() {
        assert_eq!(
            import_params_for_jwk(&jwk("EC", None, Some("P-384"))).unwrap(),
            ImportParams::Ecdsa { curve: NamedCurve::P384 }
        );
        assert_eq!(
            import_params_for_jwk(&jwk("EC", None, None)).unwrap(),
            ImportParams::Ecdsa { curve: NamedCurve::P256 }
        );
        assert_eq!(import_params_for_jwk(&jwk("OKP", None, Some("Ed25519"))).unwrap(), ImportParams::Eddsa);
    }

    #[test]
    fn unknown_kty_is_an_error() {
        assert!(matches!(
            import_params_for_jwk(&jwk("oct", None, None)),
            Err(ProtoError::UnknownKeyType(_))
        ));
        assert!(matches!(
            import_params_for_jwk(&Jwk::default()),
            Err(ProtoError::UnknownKeyType(_))
        ));
    }

    #[tokio::test]
    async fn pair_normalization_selects_the_right_half() {
        let engine = RustCryptoEngine;
        let pair = engine
            .generate_key(&KeyAlgorithm::Eddsa, true, &[KeyUsage::Sign, KeyUsage::Verify])
            .await
            .unwrap();
        let jwk_pair = pair_to_jwk(&engine, &pair).await.unwrap();

        let input = KeyRepr::from(jwk_pair);
        let secret = normalize_secret(&engine, &input).await.unwrap();
        let public = normalize_public(&engine, &input).await.unwrap();

        assert!(secret.allows(KeyUsage::Sign));
        assert!(public.allows(KeyUsage::Verify));
        assert_eq!(secret.as_bytes(), pair.secret.as_bytes());
        assert_eq!(public.as_bytes(), pair.public.as_bytes());
    }

    #[tokio::test]
    async fn multibase_is_not_a_secret_key() {
        let engine = RustCryptoEngine;
        let pair = engine
            .generate_key(&KeyAlgorithm::Eddsa, true, &[KeyUsage::Sign, KeyUsage::Verify])
            .await
            .unwrap();
        let mk = crate::multikey::to_multikey(&pair).unwrap();

        let input = KeyRepr::Multibase(mk.public_key_multibase.clone());
        assert!(matches!(
            normalize_secret(&engine, &input).await,
            Err(ProtoError::MultibaseSecretKey)
        ));
        // The same value is a perfectly good verification key.
        assert!(normalize_public(&engine, &input).await.is_ok());
    }

    #[tokio::test]
    async fn mixed_family_jwk_pair_is_rejected() {
        let engine = RustCryptoEngine;
        let ed = engine
            .generate_key(&KeyAlgorithm::Eddsa, true, &[KeyUsage::Sign, KeyUsage::Verify])
            .await
            .unwrap();
        let ec = engine
            .generate_key(
                &KeyAlgorithm::Ecdsa { curve: NamedCurve::P256 },
                true,
                &[KeyUsage::Sign, KeyUsage::Verify],
            )
            .await
            .unwrap();

        let mixed = JwkPair {
            public: engine.export_jwk(&ed.public).await.unwrap(),
            secret: engine.export_jwk(&ec.secret).await.unwrap(),
        };
        assert!(jwk_pair_to_canonical(&engine, &mixed).await.is_err());
    }
}
