//! # crosskey-proto: key representation formats
//!
//! Provides:
//! - Representation classification (canonical / JWK / Multikey / Multibase)
//! - Normalization of every representation to canonical engine keys
//! - The Multikey/Multibase multicodec bridge
//! - Output encoding policy for signatures and ciphertexts
//!
//! ## Classification
//!
//! Untyped JSON goes through an ordered list of structural tests; the order
//! is fixed and matters, since the tests are duck-typed:
//!
//! | priority | shape | test |
//! |---|---|---|
//! | 1 | canonical pair | `privateKey` + `publicKey`, both engine-shaped |
//! | 2 | canonical key | `algorithm`/`extractable`/`type`/`usages` |
//! | 3 | Multikey | both multibase fields decode |
//! | 4 | Multibase | `z`/`u` string, remainder decodes |
//! | 5 | JWK pair | `publicKeyJwk` + `secretKeyJwk` |
//! | 6 | plain JWK | everything else |

pub mod convert;
pub mod error;
pub mod multikey;
pub mod output;
pub mod repr;

pub use convert::{
    canonical_to_jwk, import_params_for_jwk, jwk_pair_to_canonical, jwk_to_canonical,
    normalize_public, normalize_secret, pair_to_jwk,
};
pub use error::{ProtoError, ProtoResult};
pub use multikey::{from_multikey, public_from_multibase, to_multikey};
pub use output::{
    decode_result, encode_result, BaseEncoding, OutputFormat, OutputOptions, ResolvedOptions,
};
pub use repr::{classify, is_multibase, is_multikey, KeyRepr, Multibase, Multikey};
