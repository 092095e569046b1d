use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid RSA modulus length: {0} (must be 1024, 2048, or 4096)")]
    InvalidModulusLength(u32),

    #[error("Unknown crypto algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Unknown named curve: {0}")]
    UnknownCurve(String),

    #[error("Unknown hash algorithm: {0}")]
    UnknownHash(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Key import failed: {0}")]
    Import(String),

    #[error("Key export failed: {0}")]
    Export(String),

    #[error("Key is not extractable")]
    NotExtractable,

    #[error("Key usage does not permit {0}")]
    UsageNotPermitted(&'static str),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Operation not supported by this engine: {0}")]
    Unsupported(&'static str),
}

pub type CoreResult<T> = Result<T, CoreError>;
