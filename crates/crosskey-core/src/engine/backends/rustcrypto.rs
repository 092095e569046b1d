//! Default engine over the RustCrypto ecosystem.
//!
//! ECDSA via p256/p384, EdDSA via ed25519-dalek, RSA PSS/OAEP via the rsa
//! crate, digests via sha2. Signature formats follow platform conventions:
//! fixed-size r||s for ECDSA, 64 bytes for Ed25519, modulus-sized for RSA.

use crate::algorithm::{HashAlgorithm, ImportParams, KeyAlgorithm, NamedCurve, OperationParams};
use crate::error::{CoreError, CoreResult};
use crate::jwk::Jwk;
use crate::key::{CanonicalKey, CanonicalKeyPair, KeyKind, KeyUsage};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use p256::ecdsa::signature::{Signer as _, Verifier as _};
use rand::rngs::OsRng;
use rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey,
};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::BigUint;
use sha2::{Digest, Sha256, Sha384};

/// The default [`CryptoEngine`](crate::engine::CryptoEngine) implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoEngine;

#[async_trait]
impl crate::engine::CryptoEngine for RustCryptoEngine {
    async fn generate_key(
        &self,
        algorithm: &KeyAlgorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> CoreResult<CanonicalKeyPair> {
        let (public_material, secret_material) = match algorithm {
            KeyAlgorithm::Eddsa => {
                let sk = ed25519_dalek::SigningKey::generate(&mut OsRng);
                (
                    sk.verifying_key().to_bytes().to_vec(),
                    sk.to_bytes().to_vec(),
                )
            }
            KeyAlgorithm::Ecdsa { curve: NamedCurve::P256 } => {
                let sk = p256::ecdsa::SigningKey::random(&mut OsRng);
                (
                    sk.verifying_key().to_encoded_point(false).as_bytes().to_vec(),
                    sk.to_bytes().to_vec(),
                )
            }
            KeyAlgorithm::Ecdsa { curve: NamedCurve::P384 } => {
                let sk = p384::ecdsa::SigningKey::random(&mut OsRng);
                (
                    sk.verifying_key().to_encoded_point(false).as_bytes().to_vec(),
                    sk.to_bytes().to_vec(),
                )
            }
            KeyAlgorithm::RsaPss { modulus_length, .. }
            | KeyAlgorithm::RsaOaep { modulus_length, .. } => {
                let sk = rsa::RsaPrivateKey::new(&mut OsRng, *modulus_length as usize)
                    .map_err(|e| CoreError::KeyGeneration(e.to_string()))?;
                let public = sk
                    .to_public_key()
                    .to_pkcs1_der()
                    .map_err(|e| CoreError::KeyGeneration(e.to_string()))?
                    .as_bytes()
                    .to_vec();
                let secret = sk
                    .to_pkcs1_der()
                    .map_err(|e| CoreError::KeyGeneration(e.to_string()))?
                    .as_bytes()
                    .to_vec();
                (public, secret)
            }
        };

        let public_usages: Vec<KeyUsage> = usages
            .iter()
            .copied()
            .filter(|u| matches!(u, KeyUsage::Verify | KeyUsage::Encrypt))
            .collect();
        let secret_usages: Vec<KeyUsage> = usages
            .iter()
            .copied()
            .filter(|u| matches!(u, KeyUsage::Sign | KeyUsage::Decrypt))
            .collect();

        CanonicalKeyPair::new(
            CanonicalKey::new(
                algorithm.clone(),
                KeyKind::Public,
                extractable,
                public_usages,
                public_material,
            ),
            CanonicalKey::new(
                algorithm.clone(),
                KeyKind::Private,
                extractable,
                secret_usages,
                secret_material,
            ),
        )
    }

    async fn import_jwk(
        &self,
        jwk: &Jwk,
        params: ImportParams,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> CoreResult<CanonicalKey> {
        match params {
            ImportParams::Eddsa => {
                if let Some(d) = &jwk.d {
                    let seed: [u8; 32] = b64_decode(d)?.try_into().map_err(|_| {
                        CoreError::Import("Ed25519 private component must be 32 bytes".into())
                    })?;
                    // Parse to validate; the seed itself is the material.
                    let sk = ed25519_dalek::SigningKey::from_bytes(&seed);
                    Ok(CanonicalKey::new(
                        KeyAlgorithm::Eddsa,
                        KeyKind::Private,
                        extractable,
                        usages.to_vec(),
                        sk.to_bytes().to_vec(),
                    ))
                } else {
                    let x: [u8; 32] = required(jwk.x.as_deref(), "x")?.try_into().map_err(|_| {
                        CoreError::Import("Ed25519 public component must be 32 bytes".into())
                    })?;
                    ed25519_dalek::VerifyingKey::from_bytes(&x)
                        .map_err(|e| CoreError::Import(e.to_string()))?;
                    Ok(CanonicalKey::new(
                        KeyAlgorithm::Eddsa,
                        KeyKind::Public,
                        extractable,
                        usages.to_vec(),
                        x.to_vec(),
                    ))
                }
            }
            ImportParams::Ecdsa { curve } => {
                let algorithm = KeyAlgorithm::Ecdsa { curve };
                if let Some(d) = &jwk.d {
                    let scalar = b64_decode(d)?;
                    validate_ec_scalar(curve, &scalar)?;
                    Ok(CanonicalKey::new(
                        algorithm,
                        KeyKind::Private,
                        extractable,
                        usages.to_vec(),
                        scalar,
                    ))
                } else {
                    let x = required(jwk.x.as_deref(), "x")?;
                    let y = required(jwk.y.as_deref(), "y")?;
                    let size = curve.field_size();
                    if x.len() != size || y.len() != size {
                        return Err(CoreError::Import(format!(
                            "EC coordinates must be {size} bytes for {curve}"
                        )));
                    }
                    let mut sec1 = Vec::with_capacity(1 + 2 * size);
                    sec1.push(0x04);
                    sec1.extend_from_slice(&x);
                    sec1.extend_from_slice(&y);
                    validate_ec_point(curve, &sec1)?;
                    Ok(CanonicalKey::new(
                        algorithm,
                        KeyKind::Public,
                        extractable,
                        usages.to_vec(),
                        sec1,
                    ))
                }
            }
            ImportParams::RsaPss { hash } | ImportParams::RsaOaep { hash } => {
                let n = BigUint::from_bytes_be(&required(jwk.n.as_deref(), "n")?);
                let e = BigUint::from_bytes_be(&required(jwk.e.as_deref(), "e")?);
                let modulus_length = n.bits() as u32;

                let algorithm = match params {
                    ImportParams::RsaPss { .. } => KeyAlgorithm::RsaPss { modulus_length, hash },
                    _ => KeyAlgorithm::RsaOaep { modulus_length, hash },
                };

                if let Some(d) = &jwk.d {
                    let d = BigUint::from_bytes_be(&b64_decode(d)?);
                    let (p, q) = match (&jwk.p, &jwk.q) {
                        (Some(p), Some(q)) => (
                            BigUint::from_bytes_be(&b64_decode(p)?),
                            BigUint::from_bytes_be(&b64_decode(q)?),
                        ),
                        _ => {
                            return Err(CoreError::Import(
                                "RSA private JWK must include p and q".into(),
                            ))
                        }
                    };
                    let sk = rsa::RsaPrivateKey::from_components(n, e, d, vec![p, q])
                        .map_err(|e| CoreError::Import(e.to_string()))?;
                    let der = sk
                        .to_pkcs1_der()
                        .map_err(|e| CoreError::Import(e.to_string()))?
                        .as_bytes()
                        .to_vec();
                    Ok(CanonicalKey::new(
                        algorithm,
                        KeyKind::Private,
                        extractable,
                        usages.to_vec(),
                        der,
                    ))
                } else {
                    let pk = rsa::RsaPublicKey::new(n, e)
                        .map_err(|e| CoreError::Import(e.to_string()))?;
                    let der = pk
                        .to_pkcs1_der()
                        .map_err(|e| CoreError::Import(e.to_string()))?
                        .as_bytes()
                        .to_vec();
                    Ok(CanonicalKey::new(
                        algorithm,
                        KeyKind::Public,
                        extractable,
                        usages.to_vec(),
                        der,
                    ))
                }
            }
        }
    }

    async fn export_jwk(&self, key: &CanonicalKey) -> CoreResult<Jwk> {
        if !key.extractable() {
            return Err(CoreError::NotExtractable);
        }

        let mut jwk = match key.algorithm() {
            KeyAlgorithm::Eddsa => {
                let mut jwk = Jwk {
                    kty: Some("OKP".into()),
                    crv: Some("Ed25519".into()),
                    ..Default::default()
                };
                match key.kind() {
                    KeyKind::Public => jwk.x = Some(b64_encode(key.as_bytes())),
                    KeyKind::Private => {
                        let seed: [u8; 32] = key.as_bytes().try_into().map_err(|_| {
                            CoreError::Export("corrupt Ed25519 key material".into())
                        })?;
                        let sk = ed25519_dalek::SigningKey::from_bytes(&seed);
                        jwk.x = Some(b64_encode(&sk.verifying_key().to_bytes()));
                        jwk.d = Some(b64_encode(&seed));
                    }
                }
                jwk
            }
            KeyAlgorithm::Ecdsa { curve } => {
                let mut jwk = Jwk {
                    kty: Some("EC".into()),
                    crv: Some(curve.to_string()),
                    ..Default::default()
                };
                let point = match key.kind() {
                    KeyKind::Public => key.as_bytes().to_vec(),
                    KeyKind::Private => {
                        jwk.d = Some(b64_encode(key.as_bytes()));
                        ec_public_point(*curve, key.as_bytes())?
                    }
                };
                let size = curve.field_size();
                if point.len() != 1 + 2 * size || point[0] != 0x04 {
                    return Err(CoreError::Export("corrupt EC key material".into()));
                }
                jwk.x = Some(b64_encode(&point[1..1 + size]));
                jwk.y = Some(b64_encode(&point[1 + size..]));
                jwk
            }
            KeyAlgorithm::RsaPss { hash, .. } | KeyAlgorithm::RsaOaep { hash, .. } => {
                let alg = match (key.algorithm(), hash) {
                    (KeyAlgorithm::RsaPss { .. }, HashAlgorithm::Sha256) => "PS256",
                    (KeyAlgorithm::RsaPss { .. }, HashAlgorithm::Sha384) => "PS384",
                    (_, HashAlgorithm::Sha256) => "RSA-OAEP-256",
                    (_, HashAlgorithm::Sha384) => "RSA-OAEP-384",
                };
                let mut jwk = Jwk {
                    kty: Some("RSA".into()),
                    alg: Some(alg.into()),
                    ..Default::default()
                };
                match key.kind() {
                    KeyKind::Public => {
                        let pk = rsa::RsaPublicKey::from_pkcs1_der(key.as_bytes())
                            .map_err(|e| CoreError::Export(e.to_string()))?;
                        jwk.n = Some(b64_encode(&pk.n().to_bytes_be()));
                        jwk.e = Some(b64_encode(&pk.e().to_bytes_be()));
                    }
                    KeyKind::Private => {
                        let sk = rsa::RsaPrivateKey::from_pkcs1_der(key.as_bytes())
                            .map_err(|e| CoreError::Export(e.to_string()))?;
                        jwk.n = Some(b64_encode(&sk.n().to_bytes_be()));
                        jwk.e = Some(b64_encode(&sk.e().to_bytes_be()));
                        jwk.d = Some(b64_encode(&sk.d().to_bytes_be()));
                        let primes = sk.primes();
                        if primes.len() >= 2 {
                            jwk.p = Some(b64_encode(&primes[0].to_bytes_be()));
                            jwk.q = Some(b64_encode(&primes[1].to_bytes_be()));
                        }
                    }
                }
                jwk
            }
        };

        jwk.ext = Some(true);
        jwk.key_ops = Some(key.usages().iter().map(usage_name).collect());
        Ok(jwk)
    }

    async fn sign(
        &self,
        params: &OperationParams,
        key: &CanonicalKey,
        data: &[u8],
    ) -> CoreResult<Vec<u8>> {
        if !key.allows(KeyUsage::Sign) {
            return Err(CoreError::UsageNotPermitted("sign"));
        }
        match params {
            OperationParams::Eddsa => {
                let seed: [u8; 32] = key
                    .as_bytes()
                    .try_into()
                    .map_err(|_| CoreError::InvalidKey("corrupt Ed25519 key material".into()))?;
                let sk = ed25519_dalek::SigningKey::from_bytes(&seed);
                Ok(sk.sign(data).to_bytes().to_vec())
            }
            OperationParams::Ecdsa { curve: NamedCurve::P256, .. } => {
                let sk = p256::ecdsa::SigningKey::from_slice(key.as_bytes())
                    .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
                let sig: p256::ecdsa::Signature = sk.sign(data);
                Ok(sig.to_bytes().to_vec())
            }
            OperationParams::Ecdsa { curve: NamedCurve::P384, .. } => {
                let sk = p384::ecdsa::SigningKey::from_slice(key.as_bytes())
                    .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
                let sig: p384::ecdsa::Signature = sk.sign(data);
                Ok(sig.to_bytes().to_vec())
            }
            OperationParams::RsaPss { salt_length } => {
                let sk = rsa::RsaPrivateKey::from_pkcs1_der(key.as_bytes())
                    .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
                let hash = rsa_pss_hash(key)?;
                let signed = match hash {
                    HashAlgorithm::Sha256 => sk.sign_with_rng(
                        &mut OsRng,
                        rsa::Pss::new_with_salt::<Sha256>(*salt_length as usize),
                        &Sha256::digest(data),
                    ),
                    HashAlgorithm::Sha384 => sk.sign_with_rng(
                        &mut OsRng,
                        rsa::Pss::new_with_salt::<Sha384>(*salt_length as usize),
                        &Sha384::digest(data),
                    ),
                };
                signed.map_err(|e| CoreError::Signing(e.to_string()))
            }
            OperationParams::RsaOaep => {
                Err(CoreError::Signing("RSA-OAEP keys cannot sign".into()))
            }
        }
    }

    async fn verify(
        &self,
        params: &OperationParams,
        key: &CanonicalKey,
        signature: &[u8],
        data: &[u8],
    ) -> CoreResult<bool> {
        if !key.allows(KeyUsage::Verify) {
            return Err(CoreError::UsageNotPermitted("verify"));
        }
        match params {
            OperationParams::Eddsa => {
                let public: [u8; 32] = key
                    .as_bytes()
                    .try_into()
                    .map_err(|_| CoreError::InvalidKey("corrupt Ed25519 key material".into()))?;
                let vk = ed25519_dalek::VerifyingKey::from_bytes(&public)
                    .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
                let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
                    return Ok(false);
                };
                let sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);
                Ok(vk.verify(data, &sig).is_ok())
            }
            OperationParams::Ecdsa { curve: NamedCurve::P256, .. } => {
                let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(key.as_bytes())
                    .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
                match p256::ecdsa::Signature::from_slice(signature) {
                    Ok(sig) => Ok(vk.verify(data, &sig).is_ok()),
                    Err(_) => Ok(false),
                }
            }
            OperationParams::Ecdsa { curve: NamedCurve::P384, .. } => {
                let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(key.as_bytes())
                    .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
                match p384::ecdsa::Signature::from_slice(signature) {
                    Ok(sig) => Ok(vk.verify(data, &sig).is_ok()),
                    Err(_) => Ok(false),
                }
            }
            OperationParams::RsaPss { salt_length } => {
                let pk = rsa::RsaPublicKey::from_pkcs1_der(key.as_bytes())
                    .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
                let hash = rsa_pss_hash(key)?;
                let verified = match hash {
                    HashAlgorithm::Sha256 => pk.verify(
                        rsa::Pss::new_with_salt::<Sha256>(*salt_length as usize),
                        &Sha256::digest(data),
                        signature,
                    ),
                    HashAlgorithm::Sha384 => pk.verify(
                        rsa::Pss::new_with_salt::<Sha384>(*salt_length as usize),
                        &Sha384::digest(data),
                        signature,
                    ),
                };
                Ok(verified.is_ok())
            }
            OperationParams::RsaOaep => {
                Err(CoreError::InvalidKey("RSA-OAEP keys cannot verify".into()))
            }
        }
    }

    async fn encrypt(
        &self,
        params: &OperationParams,
        key: &CanonicalKey,
        data: &[u8],
    ) -> CoreResult<Vec<u8>> {
        if !key.allows(KeyUsage::Encrypt) {
            return Err(CoreError::UsageNotPermitted("encrypt"));
        }
        let OperationParams::RsaOaep = params else {
            return Err(CoreError::Encryption(
                "only RSA-OAEP keys support encryption".into(),
            ));
        };
        let pk = rsa::RsaPublicKey::from_pkcs1_der(key.as_bytes())
            .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
        let encrypted = match rsa_oaep_hash(key)? {
            HashAlgorithm::Sha256 => pk.encrypt(&mut OsRng, rsa::Oaep::new::<Sha256>(), data),
            HashAlgorithm::Sha384 => pk.encrypt(&mut OsRng, rsa::Oaep::new::<Sha384>(), data),
        };
        encrypted.map_err(|e| CoreError::Encryption(e.to_string()))
    }

    async fn decrypt(
        &self,
        params: &OperationParams,
        key: &CanonicalKey,
        data: &[u8],
    ) -> CoreResult<Vec<u8>> {
        if !key.allows(KeyUsage::Decrypt) {
            return Err(CoreError::UsageNotPermitted("decrypt"));
        }
        let OperationParams::RsaOaep = params else {
            return Err(CoreError::Decryption(
                "only RSA-OAEP keys support decryption".into(),
            ));
        };
        let sk = rsa::RsaPrivateKey::from_pkcs1_der(key.as_bytes())
            .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
        let decrypted = match rsa_oaep_hash(key)? {
            HashAlgorithm::Sha256 => sk.decrypt(rsa::Oaep::new::<Sha256>(), data),
            HashAlgorithm::Sha384 => sk.decrypt(rsa::Oaep::new::<Sha384>(), data),
        };
        decrypted.map_err(|e| CoreError::Decryption(e.to_string()))
    }

    async fn digest(&self, algorithm: HashAlgorithm, data: &[u8]) -> CoreResult<Vec<u8>> {
        Ok(match algorithm {
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        })
    }
}

fn b64_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn b64_decode(text: &str) -> CoreResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(text)
        .map_err(|e| CoreError::Import(format!("invalid base64url component: {e}")))
}

fn required(field: Option<&str>, name: &str) -> CoreResult<Vec<u8>> {
    let text = field
        .ok_or_else(|| CoreError::Import(format!("JWK missing required field: {name}")))?;
    b64_decode(text)
}

fn usage_name(usage: &KeyUsage) -> String {
    match usage {
        KeyUsage::Sign => "sign",
        KeyUsage::Verify => "verify",
        KeyUsage::Encrypt => "encrypt",
        KeyUsage::Decrypt => "decrypt",
    }
    .to_string()
}

/// The hash bound into an RSA-PSS key descriptor.
fn rsa_pss_hash(key: &CanonicalKey) -> CoreResult<HashAlgorithm> {
    match key.algorithm() {
        KeyAlgorithm::RsaPss { hash, .. } => Ok(*hash),
        other => Err(CoreError::InvalidKey(format!(
            "RSA-PSS parameters used with {} key",
            other.family()
        ))),
    }
}

fn rsa_oaep_hash(key: &CanonicalKey) -> CoreResult<HashAlgorithm> {
    match key.algorithm() {
        KeyAlgorithm::RsaOaep { hash, .. } => Ok(*hash),
        other => Err(CoreError::InvalidKey(format!(
            "RSA-OAEP parameters used with {} key",
            other.family()
        ))),
    }
}

fn validate_ec_scalar(curve: NamedCurve, scalar: &[u8]) -> CoreResult<()> {
    match curve {
        NamedCurve::P256 => p256::ecdsa::SigningKey::from_slice(scalar)
            .map(|_| ())
            .map_err(|e| CoreError::Import(e.to_string())),
        NamedCurve::P384 => p384::ecdsa::SigningKey::from_slice(scalar)
            .map(|_| ())
            .map_err(|e| CoreError::Import(e.to_string())),
    }
}

fn validate_ec_point(curve: NamedCurve, sec1: &[u8]) -> CoreResult<()> {
    match curve {
        NamedCurve::P256 => p256::ecdsa::VerifyingKey::from_sec1_bytes(sec1)
            .map(|_| ())
            .map_err(|e| CoreError::Import(e.to_string())),
        NamedCurve::P384 => p384::ecdsa::VerifyingKey::from_sec1_bytes(sec1)
            .map(|_| ())
            .map_err(|e| CoreError::Import(e.to_string())),
    }
}

/// Derive the uncompressed SEC1 public point from a private scalar.
fn ec_public_point(curve: NamedCurve, scalar: &[u8]) -> CoreResult<Vec<u8>> {
    match curve {
        NamedCurve::P256 => {
            let sk = p256::ecdsa::SigningKey::from_slice(scalar)
                .map_err(|e| CoreError::Export(e.to_string()))?;
            Ok(sk.verifying_key().to_encoded_point(false).as_bytes().to_vec())
        }
        NamedCurve::P384 => {
            let sk = p384::ecdsa::SigningKey::from_slice(scalar)
                .map_err(|e| CoreError::Export(e.to_string()))?;
            Ok(sk.verifying_key().to_encoded_point(false).as_bytes().to_vec())
        }
    }
}
