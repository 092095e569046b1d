use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtoError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Base58 decode error: {0}")]
    Base58(#[from] bs58::decode::Error),

    #[error("Invalid multibase value (begins with {0:?})")]
    InvalidMultibasePrefix(char),

    #[error("Unknown kty value for the JWK key: {0}")]
    UnknownKeyType(String),

    #[error("Multikey cannot be used for encryption")]
    MultikeyForEncryption,

    #[error("No Multikey definition for RSA")]
    NoMultikeyForRsa,

    #[error("A bare multibase string cannot supply a secret key")]
    MultibaseSecretKey,

    #[error("Malformed multikey: {0}")]
    MalformedMultikey(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Core error: {0}")]
    Core(#[from] crosskey_core::CoreError),
}

pub type ProtoResult<T> = Result<T, ProtoError>;
