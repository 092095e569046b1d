//! # crosskey: a small facade over a platform cryptography engine
//!
//! Key generation, signing/verification, encryption/decryption, and hashing,
//! with keys accepted in canonical engine form, JWK, or Multikey/Multibase,
//! and results emitted in base64 or base58, plain or multibase-framed.
//!
//! The cryptographic transforms live behind the [`CryptoEngine`] trait; the
//! default engine delegates to the RustCrypto ecosystem. What this crate
//! adds is the representation layer: recognizing which encoding a caller
//! supplied, normalizing it to the canonical key, deriving the right
//! parameter block, and encoding results — with defaults that flip to
//! base58 + multibase when Multikey conventions are in play.
//!
//! ```no_run
//! use crosskey::{CryptoSuite, CryptoAlgorithm, KeyOptions, KeyRepr};
//!
//! # async fn demo() -> crosskey::ProtoResult<()> {
//! let suite = CryptoSuite::default();
//!
//! let keys = suite.generate_keys_jwk(CryptoAlgorithm::Ecdsa, &KeyOptions::default()).await?;
//! let input = KeyRepr::from(keys);
//!
//! let signature = suite.sign("hello", &input, None).await?;
//! assert!(suite.verify("hello", &signature, &input, None).await?);
//! # Ok(())
//! # }
//! ```

mod suite;

pub use suite::CryptoSuite;

// Re-exports; some of these may go unused by typical callers, but they keep
// the public surface importable from one place.
pub use crosskey_core::{
    CanonicalKey, CanonicalKeyPair, CoreError, CoreResult, CryptoAlgorithm, CryptoEngine,
    HashAlgorithm, Jwk, JwkPair, KeyAlgorithm, KeyOptions, KeyUsage, MockEngine, NamedCurve,
    RustCryptoEngine,
};
pub use crosskey_proto::{
    classify, from_multikey, public_from_multibase, to_multikey, BaseEncoding, KeyRepr,
    Multibase, Multikey, OutputFormat, OutputOptions, ProtoError, ProtoResult,
};

use crosskey_proto::convert;

/// Get a canonical key or pair from a JWK-encoded key or pair.
///
/// Pairs import with the usage intent their algorithm implies; single keys
/// import for verification (or encryption, for OAEP keys).
pub async fn jwk_to_crypto<E: CryptoEngine>(
    engine: &E,
    keys: &KeyRepr,
) -> ProtoResult<KeyRepr> {
    match keys {
        KeyRepr::JwkPair(pair) => Ok(KeyRepr::CanonicalPair(
            convert::jwk_pair_to_canonical(engine, pair).await?,
        )),
        KeyRepr::Jwk(_) => Ok(KeyRepr::Canonical(
            convert::normalize_public(engine, keys).await?,
        )),
        other => Err(ProtoError::InvalidKey(format!(
            "expected a JWK key or key pair, got {}",
            repr_name(other)
        ))),
    }
}

/// Get a JWK representation from a canonical key or pair.
pub async fn crypto_to_jwk<E: CryptoEngine>(
    engine: &E,
    keys: &KeyRepr,
) -> ProtoResult<KeyRepr> {
    match keys {
        KeyRepr::CanonicalPair(pair) => Ok(KeyRepr::JwkPair(
            convert::pair_to_jwk(engine, pair).await?,
        )),
        KeyRepr::Canonical(key) => Ok(KeyRepr::Jwk(Box::new(
            convert::canonical_to_jwk(engine, key).await?,
        ))),
        other => Err(ProtoError::InvalidKey(format!(
            "expected a canonical key or key pair, got {}",
            repr_name(other)
        ))),
    }
}

fn repr_name(repr: &KeyRepr) -> &'static str {
    match repr {
        KeyRepr::CanonicalPair(_) => "a canonical key pair",
        KeyRepr::Canonical(_) => "a canonical key",
        KeyRepr::Multikey(_) => "a multikey",
        KeyRepr::Multibase(_) => "a multibase string",
        KeyRepr::JwkPair(_) => "a JWK key pair",
        KeyRepr::Jwk(_) => "a JWK",
    }
}
