//! JSON Web Key wire types.
//!
//! Only the fields this system reads or writes are modelled; everything is
//! optional and absent fields are omitted on output, so keys exported by
//! other engines parse without loss.

use serde::{Deserialize, Serialize};

/// A JSON Web Key. All component values are base64url-no-pad strings per
/// RFC 7517/7518.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type: "EC", "RSA", or "OKP".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kty: Option<String>,
    /// Curve name for EC/OKP keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// Algorithm identifier, e.g. "PS256" or "RSA-OAEP-256".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    // EC / OKP components
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    /// Private component (EC/OKP scalar or RSA private exponent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,

    // RSA components
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,
}

impl Jwk {
    /// Whether this JWK carries a private component.
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }
}

/// A public/private JWK pair, in the conventional wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkPair {
    #[serde(rename = "publicKeyJwk")]
    pub public: Jwk,
    #[serde(rename = "secretKeyJwk")]
    pub secret: Jwk,
}
