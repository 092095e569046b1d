//! # crosskey-core: engine boundary and canonical key model
//!
//! This crate defines the [`CryptoEngine`] trait — the boundary behind which
//! all cryptographic transforms live — together with the canonical key model
//! the rest of the workspace dispatches on: algorithm descriptors, parameter
//! blocks, key handles, and the JWK wire structs the engine imports and
//! exports.
//!
//! The default engine, [`RustCryptoEngine`], delegates to the RustCrypto
//! ecosystem (p256/p384, ed25519-dalek, rsa, sha2). [`MockEngine`] is a
//! deterministic stand-in for tests.
//!
//! Supported algorithm families: ECDSA (P-256/P-384, hash derived from the
//! curve), Ed25519, RSA-PSS (fixed 32-byte salt), and RSA-OAEP (the only
//! encryption family).

pub mod algorithm;
pub mod engine;
pub mod error;
pub mod jwk;
pub mod key;

// Re-exports for convenience
pub use algorithm::{
    resolve_key_algorithm, CryptoAlgorithm, HashAlgorithm, ImportParams, KeyAlgorithm,
    KeyOptions, NamedCurve, OperationParams, PSS_SALT_LENGTH,
};
pub use engine::{CryptoEngine, MockEngine, RustCryptoEngine};
pub use error::{CoreError, CoreResult};
pub use jwk::{Jwk, JwkPair};
pub use key::{CanonicalKey, CanonicalKeyPair, KeyKind, KeyUsage};
