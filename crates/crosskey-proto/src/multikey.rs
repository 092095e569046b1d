//! Multikey/Multibase codec: canonical keys to and from multicodec-prefixed,
//! base58-btc multibase strings.
//!
//! Layout of one encoded key: `z` + base58btc(varint(codec) || payload).
//! Public EC keys travel as compressed SEC1 points, Ed25519 as the raw 32
//! bytes; private keys as the raw scalar/seed. Only the signature families
//! have Multikey forms; RSA has none.

use crate::error::{ProtoError, ProtoResult};
use crate::repr::{Multibase, Multikey};
use crosskey_core::{
    CanonicalKey, CanonicalKeyPair, CoreError, KeyAlgorithm, KeyKind, KeyUsage, NamedCurve,
};

// Multicodec codes, from the multiformats registry.
pub const ED25519_PUB: u64 = 0xed;
pub const P256_PUB: u64 = 0x1200;
pub const P384_PUB: u64 = 0x1201;
pub const ED25519_PRIV: u64 = 0x1300;
pub const P256_PRIV: u64 = 0x1306;
pub const P384_PRIV: u64 = 0x1307;

fn varint_encode(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn varint_decode(bytes: &[u8]) -> ProtoResult<(u64, &[u8])> {
    let mut value: u64 = 0;
    for (i, byte) in bytes.iter().enumerate() {
        if i >= 9 {
            break;
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, &bytes[i + 1..]));
        }
    }
    Err(ProtoError::MalformedMultikey("truncated multicodec prefix".into()))
}

fn frame(codec: u64, payload: &[u8]) -> Multibase {
    let mut bytes = Vec::with_capacity(2 + payload.len());
    varint_encode(codec, &mut bytes);
    bytes.extend_from_slice(payload);
    Multibase(format!("z{}", bs58::encode(bytes).into_string()))
}

fn unframe(mb: &Multibase) -> ProtoResult<(u64, Vec<u8>)> {
    let Some(rest) = mb.as_str().strip_prefix('z') else {
        return Err(ProtoError::MalformedMultikey(
            "multikey values use base58-btc multibase (leading 'z')".into(),
        ));
    };
    let bytes = bs58::decode(rest).into_vec()?;
    let (codec, payload) = varint_decode(&bytes)?;
    Ok((codec, payload.to_vec()))
}

/// Public-key codec code for a signature family.
fn public_codec(algorithm: &KeyAlgorithm) -> ProtoResult<u64> {
    match algorithm {
        KeyAlgorithm::Eddsa => Ok(ED25519_PUB),
        KeyAlgorithm::Ecdsa { curve: NamedCurve::P256 } => Ok(P256_PUB),
        KeyAlgorithm::Ecdsa { curve: NamedCurve::P384 } => Ok(P384_PUB),
        KeyAlgorithm::RsaPss { .. } | KeyAlgorithm::RsaOaep { .. } => {
            Err(ProtoError::NoMultikeyForRsa)
        }
    }
}

fn private_codec(algorithm: &KeyAlgorithm) -> ProtoResult<u64> {
    match algorithm {
        KeyAlgorithm::Eddsa => Ok(ED25519_PRIV),
        KeyAlgorithm::Ecdsa { curve: NamedCurve::P256 } => Ok(P256_PRIV),
        KeyAlgorithm::Ecdsa { curve: NamedCurve::P384 } => Ok(P384_PRIV),
        KeyAlgorithm::RsaPss { .. } | KeyAlgorithm::RsaOaep { .. } => {
            Err(ProtoError::NoMultikeyForRsa)
        }
    }
}

/// Compress an EC public point for the wire; Ed25519 material is already in
/// wire form.
fn public_payload(key: &CanonicalKey) -> ProtoResult<Vec<u8>> {
    match key.algorithm() {
        KeyAlgorithm::Eddsa => Ok(key.as_bytes().to_vec()),
        KeyAlgorithm::Ecdsa { curve: NamedCurve::P256 } => {
            let point = p256::ecdsa::VerifyingKey::from_sec1_bytes(key.as_bytes())
                .map_err(|e| ProtoError::InvalidKey(e.to_string()))?;
            Ok(point.to_encoded_point(true).as_bytes().to_vec())
        }
        KeyAlgorithm::Ecdsa { curve: NamedCurve::P384 } => {
            let point = p384::ecdsa::VerifyingKey::from_sec1_bytes(key.as_bytes())
                .map_err(|e| ProtoError::InvalidKey(e.to_string()))?;
            Ok(point.to_encoded_point(true).as_bytes().to_vec())
        }
        KeyAlgorithm::RsaPss { .. } | KeyAlgorithm::RsaOaep { .. } => {
            Err(ProtoError::NoMultikeyForRsa)
        }
    }
}

/// Encode a canonical pair as a Multikey. Both halves must be extractable.
pub fn to_multikey(pair: &CanonicalKeyPair) -> ProtoResult<Multikey> {
    if !pair.public.extractable() || !pair.secret.extractable() {
        return Err(ProtoError::Core(CoreError::NotExtractable));
    }

    let public = frame(public_codec(pair.public.algorithm())?, &public_payload(&pair.public)?);
    let secret = frame(private_codec(pair.secret.algorithm())?, pair.secret.as_bytes());

    Ok(Multikey {
        public_key_multibase: public,
        secret_key_multibase: Some(secret),
    })
}

/// Decode a public multibase string to a canonical verification key.
pub fn public_from_multibase(mb: &Multibase) -> ProtoResult<CanonicalKey> {
    let (codec, payload) = unframe(mb)?;
    match codec {
        ED25519_PUB => {
            let bytes: [u8; 32] = payload.as_slice().try_into().map_err(|_| {
                ProtoError::MalformedMultikey("ed25519 public key must be 32 bytes".into())
            })?;
            ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                .map_err(|e| ProtoError::MalformedMultikey(e.to_string()))?;
            Ok(CanonicalKey::new(
                KeyAlgorithm::Eddsa,
                KeyKind::Public,
                true,
                vec![KeyUsage::Verify],
                payload,
            ))
        }
        P256_PUB => {
            let point = p256::ecdsa::VerifyingKey::from_sec1_bytes(&payload)
                .map_err(|e| ProtoError::MalformedMultikey(e.to_string()))?;
            Ok(CanonicalKey::new(
                KeyAlgorithm::Ecdsa { curve: NamedCurve::P256 },
                KeyKind::Public,
                true,
                vec![KeyUsage::Verify],
                point.to_encoded_point(false).as_bytes().to_vec(),
            ))
        }
        P384_PUB => {
            let point = p384::ecdsa::VerifyingKey::from_sec1_bytes(&payload)
                .map_err(|e| ProtoError::MalformedMultikey(e.to_string()))?;
            Ok(CanonicalKey::new(
                KeyAlgorithm::Ecdsa { curve: NamedCurve::P384 },
                KeyKind::Public,
                true,
                vec![KeyUsage::Verify],
                point.to_encoded_point(false).as_bytes().to_vec(),
            ))
        }
        other => Err(ProtoError::MalformedMultikey(format!(
            "unsupported public-key multicodec: {other:#x}"
        ))),
    }
}

fn secret_from_multibase(mb: &Multibase) -> ProtoResult<CanonicalKey> {
    let (codec, payload) = unframe(mb)?;
    let algorithm = match codec {
        ED25519_PRIV => {
            if payload.len() != 32 {
                return Err(ProtoError::MalformedMultikey(
                    "ed25519 secret key must be 32 bytes".into(),
                ));
            }
            KeyAlgorithm::Eddsa
        }
        P256_PRIV => {
            p256::ecdsa::SigningKey::from_slice(&payload)
                .map_err(|e| ProtoError::MalformedMultikey(e.to_string()))?;
            KeyAlgorithm::Ecdsa { curve: NamedCurve::P256 }
        }
        P384_PRIV => {
            p384::ecdsa::SigningKey::from_slice(&payload)
                .map_err(|e| ProtoError::MalformedMultikey(e.to_string()))?;
            KeyAlgorithm::Ecdsa { curve: NamedCurve::P384 }
        }
        other => {
            return Err(ProtoError::MalformedMultikey(format!(
                "unsupported secret-key multicodec: {other:#x}"
            )))
        }
    };
    Ok(CanonicalKey::new(
        algorithm,
        KeyKind::Private,
        true,
        vec![KeyUsage::Sign],
        payload,
    ))
}

/// Decode a full Multikey to a canonical pair. The secret half is required;
/// the portable public-only form is the bare multibase string.
pub fn from_multikey(mk: &Multikey) -> ProtoResult<CanonicalKeyPair> {
    let public = public_from_multibase(&mk.public_key_multibase)?;
    let secret = match &mk.secret_key_multibase {
        Some(mb) => secret_from_multibase(mb)?,
        None => {
            return Err(ProtoError::MalformedMultikey(
                "multikey is missing its secret half".into(),
            ))
        }
    };
    if public.algorithm() != secret.algorithm() {
        return Err(ProtoError::MalformedMultikey(format!(
            "multikey halves disagree: {} vs {}",
            public.algorithm().family(),
            secret.algorithm().family(),
        )));
    }
    Ok(CanonicalKeyPair { public, secret })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosskey_core::{CryptoEngine, RustCryptoEngine};

    async fn fresh_pair(algorithm: KeyAlgorithm) -> CanonicalKeyPair {
        RustCryptoEngine
            .generate_key(&algorithm, true, &[KeyUsage::Sign, KeyUsage::Verify])
            .await
            .unwrap()
    }

    #[test]
    fn varint_round_trip() {
        for code in [ED25519_PUB, P256_PUB, P384_PUB, ED25519_PRIV, P256_PRIV, P384_PRIV] {
            let mut buf = Vec::new();
            varint_encode(code, &mut buf);
            let (decoded, rest) = varint_decode(&buf).unwrap();
            assert_eq!(decoded, code);
            assert!(rest.is_empty());
        }
        // The registry spellings, for the two byte-width classes.
        let mut buf = Vec::new();
        varint_encode(ED25519_PUB, &mut buf);
        assert_eq!(buf, [0xed, 0x01]);
        buf.clear();
        varint_encode(P256_PUB, &mut buf);
        assert_eq!(buf, [0x80, 0x24]);
    }

    #[tokio::test]
    async fn eddsa_pair_round_trips() {
        let pair = fresh_pair(KeyAlgorithm::Eddsa).await;
        let mk = to_multikey(&pair).unwrap();

        assert!(mk.public_key_multibase.as_str().starts_with("z6Mk"));
        assert!(mk.secret_key_multibase.is_some());

        let restored = from_multikey(&mk).unwrap();
        assert_eq!(restored.public.as_bytes(), pair.public.as_bytes());
        assert_eq!(restored.secret.as_bytes(), pair.secret.as_bytes());
        assert!(restored.secret.allows(KeyUsage::Sign));
    }

    #[tokio::test]
    async fn ec_public_key_compresses_on_the_wire() {
        for curve in [NamedCurve::P256, NamedCurve::P384] {
            let pair = fresh_pair(KeyAlgorithm::Ecdsa { curve }).await;
            let mk = to_multikey(&pair).unwrap();

            let (_, payload) = unframe(&mk.public_key_multibase).unwrap();
            assert_eq!(payload.len(), 1 + curve.field_size()); // compressed point

            // Decoding restores the uncompressed canonical form.
            let restored = public_from_multibase(&mk.public_key_multibase).unwrap();
            assert_eq!(restored.as_bytes(), pair.public.as_bytes());
        }
    }

    #[tokio::test]
    async fn rsa_has_no_multikey_form() {
        use crosskey_core::HashAlgorithm;
        let pair = RustCryptoEngine
            .generate_key(
                &KeyAlgorithm::RsaPss { modulus_length: 1024, hash: HashAlgorithm::Sha256 },
                true,
                &[KeyUsage::Sign, KeyUsage::Verify],
            )
            .await
            .unwrap();
        assert!(matches!(to_multikey(&pair), Err(ProtoError::NoMultikeyForRsa)));
    }

    #[tokio::test]
    async fn public_only_multikey_is_rejected_for_pairs() {
        let pair = fresh_pair(KeyAlgorithm::Eddsa).await;
        let mut mk = to_multikey(&pair).unwrap();
        mk.secret_key_multibase = None;

        assert!(matches!(from_multikey(&mk), Err(ProtoError::MalformedMultikey(_))));
        // The public half still decodes on its own.
        assert!(public_from_multibase(&mk.public_key_multibase).is_ok());
    }

    #[tokio::test]
    async fn mismatched_halves_are_rejected() {
        let ed = fresh_pair(KeyAlgorithm::Eddsa).await;
        let ec = fresh_pair(KeyAlgorithm::Ecdsa { curve: NamedCurve::P256 }).await;

        let mk = Multikey {
            public_key_multibase: to_multikey(&ed).unwrap().public_key_multibase,
            secret_key_multibase: to_multikey(&ec).unwrap().secret_key_multibase,
        };
        assert!(matches!(from_multikey(&mk), Err(ProtoError::MalformedMultikey(_))));
    }

    #[tokio::test]
    async fn non_extractable_pair_refuses_encoding() {
        let pair = RustCryptoEngine
            .generate_key(&KeyAlgorithm::Eddsa, false, &[KeyUsage::Sign, KeyUsage::Verify])
            .await
            .unwrap();
        assert!(matches!(
            to_multikey(&pair),
            Err(ProtoError::Core(CoreError::NotExtractable))
        ));
    }
}
