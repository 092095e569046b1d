//! Mock engine for testing.
//!
//! NOT SECURE - signatures are keyed digests and encryption is a digest
//! keystream XOR. Lets facade plumbing be exercised without cryptographic
//! cost. JWK import/export is unsupported; use the real engine for that.

use crate::algorithm::{HashAlgorithm, ImportParams, KeyAlgorithm, OperationParams};
use crate::error::{CoreError, CoreResult};
use crate::jwk::Jwk;
use crate::key::{CanonicalKey, CanonicalKeyPair, KeyKind, KeyUsage};
use async_trait::async_trait;
use rand::RngCore;
use sha2::{Digest, Sha256, Sha384};

pub struct MockEngine;

fn keyed_digest(key: &CanonicalKey, data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(data);
    hasher.finalize().to_vec()
}

fn keystream_xor(key: &CanonicalKey, data: &[u8]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, byte)| {
            let mut hasher = Sha256::new();
            hasher.update(key.as_bytes());
            hasher.update((i as u64 / 32).to_le_bytes());
            byte ^ hasher.finalize()[i % 32]
        })
        .collect()
}

#[async_trait]
impl crate::engine::CryptoEngine for MockEngine {
    async fn generate_key(
        &self,
        algorithm: &KeyAlgorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> CoreResult<CanonicalKeyPair> {
        let mut material = vec![0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut material);

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

        // Mock: pk = sk, so verify can recompute the signing digest.
        CanonicalKeyPair::new(
            CanonicalKey::new(
                algorithm.clone(),
                KeyKind::Public,
                extractable,
                public_usages,
                material.clone(),
            ),
            CanonicalKey::new(
                algorithm.clone(),
                KeyKind::Private,
                extractable,
                secret_usages,
                material,
            ),
        )
    }

    async fn import_jwk(
        &self,
        _jwk: &Jwk,
        _params: ImportParams,
        _extractable: bool,
        _usages: &[KeyUsage],
    ) -> CoreResult<CanonicalKey> {
        Err(CoreError::Unsupported("mock engine cannot import JWKs"))
    }

    async fn export_jwk(&self, _key: &CanonicalKey) -> CoreResult<Jwk> {
        Err(CoreError::Unsupported("mock engine cannot export JWKs"))
    }

    async fn sign(
        &self,
        _params: &OperationParams,
        key: &CanonicalKey,
        data: &[u8],
    ) -> CoreResult<Vec<u8>> {
        if !key.allows(KeyUsage::Sign) {
            return Err(CoreError::UsageNotPermitted("sign"));
        }
        Ok(keyed_digest(key, data))
    }

    async fn verify(
        &self,
        _params: &OperationParams,
        key: &CanonicalKey,
        signature: &[u8],
        data: &[u8],
    ) -> CoreResult<bool> {
        if !key.allows(KeyUsage::Verify) {
            return Err(CoreError::UsageNotPermitted("verify"));
        }
        Ok(keyed_digest(key, data) == signature)
    }

    async fn encrypt(
        &self,
        _params: &OperationParams,
        key: &CanonicalKey,
        data: &[u8],
    ) -> CoreResult<Vec<u8>> {
        if !key.allows(KeyUsage::Encrypt) {
            return Err(CoreError::UsageNotPermitted("encrypt"));
        }
        Ok(keystream_xor(key, data))
    }

    async fn decrypt(
        &self,
        _params: &OperationParams,
        key: &CanonicalKey,
        data: &[u8],
    ) -> CoreResult<Vec<u8>> {
        if !key.allows(KeyUsage::Decrypt) {
            return Err(CoreError::UsageNotPermitted("decrypt"));
        }
        Ok(keystream_xor(key, data))
    }

    async fn digest(&self, algorithm: HashAlgorithm, data: &[u8]) -> CoreResult<Vec<u8>> {
        Ok(match algorithm {
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CryptoEngine;

    #[tokio::test]
    async fn mock_sign_verify() {
        let engine = MockEngine;
        let pair = engine
            .generate_key(&KeyAlgorithm::Eddsa, true, &[KeyUsage::Sign, KeyUsage::Verify])
            .await
            .unwrap();
        let params = pair.secret.algorithm().operation_params();

        let sig = engine.sign(&params, &pair.secret, b"hello").await.unwrap();
        assert!(engine.verify(&params, &pair.public, &sig, b"hello").await.unwrap());
        assert!(!engine.verify(&params, &pair.public, &sig, b"other").await.unwrap());
    }

    #[tokio::test]
    async fn mock_encrypt_decrypt() {
        let engine = MockEngine;
        let pair = engine
            .generate_key(
                &KeyAlgorithm::RsaOaep { modulus_length: 2048, hash: HashAlgorithm::Sha256 },
                true,
                &[KeyUsage::Encrypt, KeyUsage::Decrypt],
            )
            .await
            .unwrap();
        let params = pair.public.algorithm().operation_params();

        let plaintext = b"a message longer than one keystream block to cover the counter path";
        let ct = engine.encrypt(&params, &pair.public, plaintext).await.unwrap();
        assert_ne!(&ct, plaintext);
        let pt = engine.decrypt(&params, &pair.secret, &ct).await.unwrap();
        assert_eq!(&pt, plaintext);
    }
}
