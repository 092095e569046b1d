//! The canonical key model.
//!
//! A [`CanonicalKey`] is the engine's native key handle: an algorithm
//! descriptor, the key's type and usage list, and the raw material in a
//! per-family canonical form (Ed25519: 32 raw bytes; EC public: SEC1
//! uncompressed point; EC private: raw scalar; RSA: PKCS#1 DER). The material
//! is opaque outside the engine and the representation codecs, zeroized on
//! drop, and kept out of `Debug` output.
//!
//! Keys are immutable value handles. They serialize to the platform engine's
//! JSON shape (`algorithm`/`extractable`/`type`/`usages`, plus a base64url
//! `material` field) so that canonical keys survive a JSON round trip, which
//! is what the representation classifier probes for.

use crate::algorithm::KeyAlgorithm;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Which half of a pair a key is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyKind {
    #[serde(rename = "public")]
    Public,
    #[serde(rename = "private")]
    Private,
}

/// Operations a key is allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyUsage {
    #[serde(rename = "sign")]
    Sign,
    #[serde(rename = "verify")]
    Verify,
    #[serde(rename = "encrypt")]
    Encrypt,
    #[serde(rename = "decrypt")]
    Decrypt,
}

/// A key as understood by the crypto engine.
#[derive(Clone, PartialEq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct CanonicalKey {
    #[zeroize(skip)]
    algorithm: KeyAlgorithm,
    #[zeroize(skip)]
    #[serde(rename = "type")]
    kind: KeyKind,
    #[zeroize(skip)]
    extractable: bool,
    #[zeroize(skip)]
    usages: Vec<KeyUsage>,
    #[serde(with = "material_b64")]
    material: Vec<u8>,
}

impl CanonicalKey {
    pub fn new(
        algorithm: KeyAlgorithm,
        kind: KeyKind,
        extractable: bool,
        usages: Vec<KeyUsage>,
        material: Vec<u8>,
    ) -> Self {
        Self { algorithm, kind, extractable, usages, material }
    }

    pub fn algorithm(&self) -> &KeyAlgorithm {
        &self.algorithm
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    pub fn extractable(&self) -> bool {
        self.extractable
    }

    pub fn usages(&self) -> &[KeyUsage] {
        &self.usages
    }

    /// Raw key material in the family's canonical form.
    pub fn as_bytes(&self) -> &[u8] {
        &self.material
    }

    pub fn allows(&self, usage: KeyUsage) -> bool {
        self.usages.contains(&usage)
    }
}

impl std::fmt::Debug for CanonicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanonicalKey")
            .field("algorithm", &self.algorithm)
            .field("kind", &self.kind)
            .field("extractable", &self.extractable)
            .field("usages", &self.usages)
            .field("material", &format_args!("[{} bytes]", self.material.len()))
            .finish()
    }
}

/// A matched public/private pair sharing one algorithm family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalKeyPair {
    #[serde(rename = "publicKey")]
    pub public: CanonicalKey,
    #[serde(rename = "privateKey")]
    pub secret: CanonicalKey,
}

impl CanonicalKeyPair {
    /// Assemble a pair, enforcing that both halves share an algorithm family.
    pub fn new(public: CanonicalKey, secret: CanonicalKey) -> CoreResult<Self> {
        if public.algorithm().family() != secret.algorithm().family() {
            return Err(CoreError::InvalidKey(format!(
                "key pair mixes algorithm families: {} and {}",
                public.algorithm().family(),
                secret.algorithm().family(),
            )));
        }
        Ok(Self { public, secret })
    }
}

mod material_b64 {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(de)?;
        URL_SAFE_NO_PAD.decode(text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::NamedCurve;

    fn key(kind: KeyKind, usages: Vec<KeyUsage>) -> CanonicalKey {
        CanonicalKey::new(
            KeyAlgorithm::Ecdsa { curve: NamedCurve::P256 },
            kind,
            true,
            usages,
            vec![0xAB; 32],
        )
    }

    #[test]
    fn json_round_trip_preserves_key() {
        let original = key(KeyKind::Public, vec![KeyUsage::Verify]);
        let json = serde_json::to_value(&original).unwrap();

        // The engine-shaped attribute names the classifier relies on.
        assert!(json.get("algorithm").is_some());
        assert!(json.get("extractable").is_some());
        assert!(json.get("type").is_some());
        assert!(json.get("usages").is_some());
        assert_eq!(json["type"], "public");

        let restored: CanonicalKey = serde_json::from_value(json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn debug_redacts_material() {
        let k = key(KeyKind::Private, vec![KeyUsage::Sign]);
        let rendered = format!("{k:?}");
        assert!(rendered.contains("[32 bytes]"));
        assert!(!rendered.contains("171")); // 0xAB
    }

    #[test]
    fn pair_rejects_mixed_families() {
        let public = key(KeyKind::Public, vec![KeyUsage::Verify]);
        let secret = CanonicalKey::new(
            KeyAlgorithm::Eddsa,
            KeyKind::Private,
            true,
            vec![KeyUsage::Sign],
            vec![0u8; 32],
        );
        assert!(matches!(
            CanonicalKeyPair::new(public, secret),
            Err(CoreError::InvalidKey(_))
        ));
    }
}
