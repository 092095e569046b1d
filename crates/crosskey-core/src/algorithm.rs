//! Algorithm identifiers and parameter blocks.
//!
//! Everything here is a closed enum: the caller-facing algorithm names, the
//! canonical descriptor attached to a key, and the parameter blocks handed to
//! the engine. Exhaustive matches replace the fallback branches of
//! stringly-typed dispatch, so an unhandled family is a compile error rather
//! than a silent default.

use crate::error::{CoreError, CoreResult};
use crate::key::KeyUsage;
use serde::{Deserialize, Serialize};

/// Salt length used for RSA-PSS signatures. Not configurable externally.
pub const PSS_SALT_LENGTH: u32 = 32;

const DEFAULT_MODULUS_LENGTH: u32 = 2048;

/// Caller-facing algorithm identifiers, as accepted by key generation.
///
/// `ed25519` is an alias for `eddsa`; `rsa` is an alias for `rsa-pss`. Only
/// `rsa-oaep` can be used for encryption/decryption; all the others are
/// signature algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CryptoAlgorithm {
    Ecdsa,
    Eddsa,
    RsaPss,
    RsaOaep,
}

impl CryptoAlgorithm {
    /// Whether this is one of the RSA families.
    pub fn is_rsa(&self) -> bool {
        matches!(self, CryptoAlgorithm::RsaPss | CryptoAlgorithm::RsaOaep)
    }
}

impl std::fmt::Display for CryptoAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CryptoAlgorithm::Ecdsa => write!(f, "ecdsa"),
            CryptoAlgorithm::Eddsa => write!(f, "eddsa"),
            CryptoAlgorithm::RsaPss => write!(f, "rsa-pss"),
            CryptoAlgorithm::RsaOaep => write!(f, "rsa-oaep"),
        }
    }
}

impl std::str::FromStr for CryptoAlgorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ecdsa" => Ok(CryptoAlgorithm::Ecdsa),
            "eddsa" | "ed25519" => Ok(CryptoAlgorithm::Eddsa),
            "rsa-pss" | "rsa" => Ok(CryptoAlgorithm::RsaPss),
            "rsa-oaep" => Ok(CryptoAlgorithm::RsaOaep),
            other => Err(CoreError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Elliptic curves supported for ECDSA keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedCurve {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
}

impl NamedCurve {
    /// The hash that goes with this curve for ECDSA. Derived from the curve,
    /// never configured independently.
    pub fn hash(&self) -> HashAlgorithm {
        match self {
            NamedCurve::P256 => HashAlgorithm::Sha256,
            NamedCurve::P384 => HashAlgorithm::Sha384,
        }
    }

    /// Byte length of a field element (coordinate or scalar) on this curve.
    pub fn field_size(&self) -> usize {
        match self {
            NamedCurve::P256 => 32,
            NamedCurve::P384 => 48,
        }
    }
}

impl std::fmt::Display for NamedCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamedCurve::P256 => write!(f, "P-256"),
            NamedCurve::P384 => write!(f, "P-384"),
        }
    }
}

impl std::str::FromStr for NamedCurve {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P-256" => Ok(NamedCurve::P256),
            "P-384" => Ok(NamedCurve::P384),
            other => Err(CoreError::UnknownCurve(other.to_string())),
        }
    }
}

/// Digest algorithms supported by the engine boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "SHA-256")]
    Sha256,
    #[serde(rename = "SHA-384")]
    Sha384,
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithm::Sha256 => write!(f, "SHA-256"),
            HashAlgorithm::Sha384 => write!(f, "SHA-384"),
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHA-256" => Ok(HashAlgorithm::Sha256),
            "SHA-384" => Ok(HashAlgorithm::Sha384),
            other => Err(CoreError::UnknownHash(other.to_string())),
        }
    }
}

/// The algorithm descriptor attached to a canonical key.
///
/// The descriptor fully determines the parameter block needed to use the key;
/// see [`KeyAlgorithm::operation_params`]. The JSON form matches the platform
/// engine's algorithm object (`{"name":"ECDSA","namedCurve":"P-256"}` etc.),
/// which is what the representation classifier probes for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum KeyAlgorithm {
    #[serde(rename = "ECDSA")]
    Ecdsa {
        #[serde(rename = "namedCurve")]
        curve: NamedCurve,
    },
    #[serde(rename = "Ed25519")]
    Eddsa,
    #[serde(rename = "RSA-PSS")]
    RsaPss {
        #[serde(rename = "modulusLength")]
        modulus_length: u32,
        hash: HashAlgorithm,
    },
    #[serde(rename = "RSA-OAEP")]
    RsaOaep {
        #[serde(rename = "modulusLength")]
        modulus_length: u32,
        hash: HashAlgorithm,
    },
}

impl KeyAlgorithm {
    /// The parameter block the engine needs to sign, verify, encrypt, or
    /// decrypt with a key carrying this descriptor.
    ///
    /// Pure and total: every family maps to exactly one block. For ECDSA the
    /// hash is derived from the curve (SHA-384 for P-384, SHA-256 otherwise)
    /// regardless of anything stored alongside the key.
    pub fn operation_params(&self) -> OperationParams {
        match self {
            KeyAlgorithm::RsaOaep { .. } => OperationParams::RsaOaep,
            KeyAlgorithm::RsaPss { .. } => OperationParams::RsaPss {
                salt_length: PSS_SALT_LENGTH,
            },
            KeyAlgorithm::Ecdsa { curve } => OperationParams::Ecdsa {
                curve: *curve,
                hash: curve.hash(),
            },
            KeyAlgorithm::Eddsa => OperationParams::Eddsa,
        }
    }

    /// Both halves of a pair must agree on this.
    pub fn family(&self) -> CryptoAlgorithm {
        match self {
            KeyAlgorithm::Ecdsa { .. } => CryptoAlgorithm::Ecdsa,
            KeyAlgorithm::Eddsa => CryptoAlgorithm::Eddsa,
            KeyAlgorithm::RsaPss { .. } => CryptoAlgorithm::RsaPss,
            KeyAlgorithm::RsaOaep { .. } => CryptoAlgorithm::RsaOaep,
        }
    }
}

/// Parameter block for a single engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationParams {
    RsaOaep,
    RsaPss { salt_length: u32 },
    Ecdsa { curve: NamedCurve, hash: HashAlgorithm },
    Eddsa,
}

/// Parameter block for importing a key from a portable representation.
///
/// The modulus length of RSA keys is read off the key data itself, so import
/// parameters carry only the family and hash binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportParams {
    RsaPss { hash: HashAlgorithm },
    RsaOaep { hash: HashAlgorithm },
    Ecdsa { curve: NamedCurve },
    Eddsa,
}

/// Options for key generation. Each field has an algorithm-family-specific
/// default; fields irrelevant to the requested family are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyOptions {
    /// Choice of elliptic curve; relevant for ecdsa. Defaults to P-256.
    #[serde(rename = "namedCurve", skip_serializing_if = "Option::is_none")]
    pub named_curve: Option<NamedCurve>,
    /// Hash bound into RSA keys; relevant for rsa-pss and rsa-oaep.
    /// Defaults to SHA-256.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<HashAlgorithm>,
    /// RSA key modulus in bits. Can be 1024, 2048, or 4096; defaults to 2048.
    #[serde(rename = "modulusLength", skip_serializing_if = "Option::is_none")]
    pub modulus_length: Option<u32>,
}

/// Map a caller-facing algorithm identifier plus options to the canonical
/// descriptor and the usages the generated pair should carry.
///
/// The modulus length is validated only when an RSA family is requested;
/// for ecdsa/eddsa the field is irrelevant and ignored.
pub fn resolve_key_algorithm(
    algorithm: CryptoAlgorithm,
    options: &KeyOptions,
) -> CoreResult<(KeyAlgorithm, Vec<KeyUsage>)> {
    match algorithm {
        CryptoAlgorithm::RsaOaep => Ok((
            KeyAlgorithm::RsaOaep {
                modulus_length: validated_modulus(options)?,
                hash: options.hash.unwrap_or_default(),
            },
            vec![KeyUsage::Encrypt, KeyUsage::Decrypt],
        )),
        CryptoAlgorithm::RsaPss => Ok((
            KeyAlgorithm::RsaPss {
                modulus_length: validated_modulus(options)?,
                hash: options.hash.unwrap_or_default(),
            },
            vec![KeyUsage::Sign, KeyUsage::Verify],
        )),
        CryptoAlgorithm::Ecdsa => Ok((
            KeyAlgorithm::Ecdsa {
                curve: options.named_curve.unwrap_or(NamedCurve::P256),
            },
            vec![KeyUsage::Sign, KeyUsage::Verify],
        )),
        CryptoAlgorithm::Eddsa => Ok((
            KeyAlgorithm::Eddsa,
            vec![KeyUsage::Sign, KeyUsage::Verify],
        )),
    }
}

fn validated_modulus(options: &KeyOptions) -> CoreResult<u32> {
    match options.modulus_length {
        None => Ok(DEFAULT_MODULUS_LENGTH),
        Some(bits @ (1024 | 2048 | 4096)) => Ok(bits),
        Some(other) => Err(CoreError::InvalidModulusLength(other)),
    }
}
