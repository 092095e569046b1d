//! Key-representation classification.
//!
//! Callers hand keys over in one of several portable shapes: canonical
//! engine keys (or pairs), JWKs (or pairs), Multikeys, or bare Multibase
//! strings. [`KeyRepr`] is the closed union over those shapes; typed callers
//! construct it directly via the `From` impls, and untyped JSON goes through
//! [`classify`], an ordered list of structural predicates.
//!
//! Classification order is fixed: canonical pair, canonical key, Multikey,
//! Multibase, JWK pair, and finally plain JWK as the total fallback. The
//! order matters because the tests are structural and an input can satisfy
//! more than one of them.

use crate::error::{ProtoError, ProtoResult};
use crate::output::{BASE58_PREFIX, BASE64_PREFIX};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use crosskey_core::{CanonicalKey, CanonicalKeyPair, Jwk, JwkPair};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single multibase-framed string: indicator character + base-N payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Multibase(pub String);

impl Multibase {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Multibase {
    fn from(s: &str) -> Self {
        Multibase(s.to_string())
    }
}

/// A key pair carried as multibase-encoded public/secret fields.
///
/// The secret field is optional in the wire type, but objects without it are
/// not *classified* as Multikeys (see [`is_multikey`]); the portable
/// public-only form is the bare [`Multibase`] string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multikey {
    #[serde(rename = "publicKeyMultibase")]
    pub public_key_multibase: Multibase,
    #[serde(rename = "secretKeyMultibase", skip_serializing_if = "Option::is_none")]
    pub secret_key_multibase: Option<Multibase>,
}

/// True if the string looks like a multibase value: a known indicator
/// character followed by text that decodes under the corresponding codec.
///
/// This test is probabilistic by construction. A random string that happens
/// to start with `z` or `u` and contains only alphabet characters will pass.
/// The decode attempt shrinks the false-positive window; it cannot close it.
/// Accepted trade-off, inherited from the wire format itself.
pub fn is_multibase(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(BASE58_PREFIX) => bs58::decode(chars.as_str()).into_vec().is_ok(),
        Some(BASE64_PREFIX) => URL_SAFE_NO_PAD.decode(chars.as_str()).is_ok(),
        _ => false,
    }
}

/// True if the object carries both multikey fields with multibase values.
/// Public-only objects deliberately fail this test.
pub fn is_multikey(value: &Value) -> bool {
    let public_ok = value
        .get("publicKeyMultibase")
        .and_then(Value::as_str)
        .is_some_and(is_multibase);
    if !public_ok {
        return false;
    }
    value
        .get("secretKeyMultibase")
        .and_then(Value::as_str)
        .is_some_and(is_multibase)
}

/// True if the object exposes the engine key attributes: an algorithm
/// descriptor, the extractable flag, a type, and a usage list.
pub fn is_canonical_key(value: &Value) -> bool {
    value.get("algorithm").is_some()
        && value.get("extractable").is_some()
        && value.get("type").is_some()
        && value.get("usages").is_some()
}

/// True if the object exposes both halves of a canonical pair.
pub fn is_canonical_key_pair(value: &Value) -> bool {
    match (value.get("privateKey"), value.get("publicKey")) {
        (Some(private), Some(public)) => {
            is_canonical_key(private) && is_canonical_key(public)
        }
        _ => false,
    }
}

/// True if the object exposes both JWK-pair fields.
pub fn is_jwk_pair(value: &Value) -> bool {
    value.get("publicKeyJwk").is_some() && value.get("secretKeyJwk").is_some()
}

/// The closed union over every accepted key representation.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyRepr {
    CanonicalPair(CanonicalKeyPair),
    Canonical(CanonicalKey),
    Multikey(Multikey),
    Multibase(Multibase),
    JwkPair(JwkPair),
    Jwk(Box<Jwk>),
}

impl KeyRepr {
    /// Whether Multikey conventions are in play for this input. Drives the
    /// output-encoding defaults.
    pub fn is_multikey_flavored(&self) -> bool {
        matches!(self, KeyRepr::Multikey(_) | KeyRepr::Multibase(_))
    }
}

impl From<CanonicalKeyPair> for KeyRepr {
    fn from(pair: CanonicalKeyPair) -> Self {
        KeyRepr::CanonicalPair(pair)
    }
}

impl From<CanonicalKey> for KeyRepr {
    fn from(key: CanonicalKey) -> Self {
        KeyRepr::Canonical(key)
    }
}

impl From<Multikey> for KeyRepr {
    fn from(mk: Multikey) -> Self {
        KeyRepr::Multikey(mk)
    }
}

impl From<Multibase> for KeyRepr {
    fn from(mb: Multibase) -> Self {
        KeyRepr::Multibase(mb)
    }
}

impl From<JwkPair> for KeyRepr {
    fn from(pair: JwkPair) -> Self {
        KeyRepr::JwkPair(pair)
    }
}

impl From<Jwk> for KeyRepr {
    fn from(jwk: Jwk) -> Self {
        KeyRepr::Jwk(Box::new(jwk))
    }
}

/// Classify an untyped JSON value into a [`KeyRepr`].
///
/// Total over JSON objects and multibase-looking strings: anything that
/// matches none of the structural tests is treated as a plain JWK. A value
/// that *matches* a test but fails strict deserialization into that variant
/// is a malformed-encoding error, not a candidate for reclassification.
pub fn classify(value: &Value) -> ProtoResult<KeyRepr> {
    if is_canonical_key_pair(value) {
        let pair: CanonicalKeyPair = serde_json::from_value(value.clone())?;
        return Ok(KeyRepr::CanonicalPair(pair));
    }
    if is_canonical_key(value) {
        let key: CanonicalKey = serde_json::from_value(value.clone())?;
        return Ok(KeyRepr::Canonical(key));
    }
    if is_multikey(value) {
        let mk: Multikey = serde_json::from_value(value.clone())?;
        return Ok(KeyRepr::Multikey(mk));
    }
    if let Value::String(text) = value {
        if is_multibase(text) {
            return Ok(KeyRepr::Multibase(Multibase(text.clone())));
        }
        return Err(ProtoError::InvalidKey(
            "a string key must be a multibase value".into(),
        ));
    }
    if is_jwk_pair(value) {
        let pair: JwkPair = serde_json::from_value(value.clone())?;
        return Ok(KeyRepr::JwkPair(pair));
    }
    let jwk: Jwk = serde_json::from_value(value.clone())?;
    Ok(KeyRepr::Jwk(Box::new(jwk)))
}
