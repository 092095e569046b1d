//! The crypto-engine boundary.

use crate::algorithm::{HashAlgorithm, ImportParams, KeyAlgorithm, OperationParams};
use crate::error::CoreResult;
use crate::jwk::Jwk;
use crate::key::{CanonicalKey, CanonicalKeyPair, KeyUsage};
use async_trait::async_trait;

/// A platform cryptography engine.
///
/// The facade above delegates every cryptographic transform here; its own job
/// is only representation and dispatch. Every method is an independent unit
/// of work: no shared mutable state between concurrent calls, no caching, no
/// retries. A failing call surfaces its failure to that one caller.
///
/// Contract details implementations must honor:
/// - `export_jwk` fails on a key whose `extractable` flag is false;
/// - every operation checks the key's usage list before doing work;
/// - `verify` returns `Ok(false)` for a signature that fails to parse or
///   fails the computation — only pre-operation failures are errors.
#[async_trait]
pub trait CryptoEngine: Send + Sync {
    /// Generate a fresh key pair for the given descriptor. The secret half
    /// carries the sign/decrypt subset of `usages`, the public half the
    /// verify/encrypt subset.
    async fn generate_key(
        &self,
        algorithm: &KeyAlgorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> CoreResult<CanonicalKeyPair>;

    /// Import a single key from its JWK representation.
    async fn import_jwk(
        &self,
        jwk: &Jwk,
        params: ImportParams,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> CoreResult<CanonicalKey>;

    /// Export a key to its JWK representation.
    async fn export_jwk(&self, key: &CanonicalKey) -> CoreResult<Jwk>;

    async fn sign(
        &self,
        params: &OperationParams,
        key: &CanonicalKey,
        data: &[u8],
    ) -> CoreResult<Vec<u8>>;

    async fn verify(
        &self,
        params: &OperationParams,
        key: &CanonicalKey,
        signature: &[u8],
        data: &[u8],
    ) -> CoreResult<bool>;

    async fn encrypt(
        &self,
        params: &OperationParams,
        key: &CanonicalKey,
        data: &[u8],
    ) -> CoreResult<Vec<u8>>;

    async fn decrypt(
        &self,
        params: &OperationParams,
        key: &CanonicalKey,
        data: &[u8],
    ) -> CoreResult<Vec<u8>>;

    async fn digest(&self, algorithm: HashAlgorithm, data: &[u8]) -> CoreResult<Vec<u8>>;
}
