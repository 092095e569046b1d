//! The operation facade.
//!
//! Each operation runs the same pipeline: classify and normalize the key
//! input, derive the operation parameters from the normalized key, invoke
//! the engine, and encode or decode the byte result per the caller's
//! options. The only side effect is the engine call itself; each call is
//! self-contained, with no state shared across concurrent operations.

use crosskey_core::{
    resolve_key_algorithm, CanonicalKeyPair, CryptoAlgorithm, CryptoEngine, HashAlgorithm,
    JwkPair, KeyOptions, RustCryptoEngine,
};
use crosskey_proto::{
    convert, decode_result, encode_result, multikey, KeyRepr, Multikey, OutputOptions,
    ProtoError, ProtoResult,
};
use tracing::debug;

/// Sign/verify/encrypt/decrypt/hash over a pluggable crypto engine.
pub struct CryptoSuite<E: CryptoEngine = RustCryptoEngine> {
    engine: E,
}

impl Default for CryptoSuite<RustCryptoEngine> {
    fn default() -> Self {
        Self::new(RustCryptoEngine)
    }
}

impl<E: CryptoEngine> CryptoSuite<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Generate a key pair in the engine's canonical representation.
    ///
    /// Options irrelevant to the chosen algorithm are ignored; an invalid
    /// RSA modulus length is rejected before the engine is invoked.
    pub async fn generate_keys(
        &self,
        algorithm: CryptoAlgorithm,
        options: &KeyOptions,
    ) -> ProtoResult<CanonicalKeyPair> {
        let (key_algorithm, usages) = resolve_key_algorithm(algorithm, options)?;
        debug!(%algorithm, "generating key pair");
        Ok(self.engine.generate_key(&key_algorithm, true, &usages).await?)
    }

    /// Generate a key pair and export it as a JWK pair.
    pub async fn generate_keys_jwk(
        &self,
        algorithm: CryptoAlgorithm,
        options: &KeyOptions,
    ) -> ProtoResult<JwkPair> {
        let pair = self.generate_keys(algorithm, options).await?;
        convert::pair_to_jwk(&self.engine, &pair).await
    }

    /// Generate a key pair and export it as a Multikey. Only the signature
    /// families have a Multikey form; RSA is rejected up front.
    pub async fn generate_keys_mk(
        &self,
        algorithm: CryptoAlgorithm,
        options: &KeyOptions,
    ) -> ProtoResult<Multikey> {
        if algorithm.is_rsa() {
            return Err(ProtoError::NoMultikeyForRsa);
        }
        let pair = self.generate_keys(algorithm, options).await?;
        multikey::to_multikey(&pair)
    }

    /// Sign a message with the secret half of `keys`.
    ///
    /// Output defaults depend on the key flavor: a Multikey input yields a
    /// base58 multibase string, anything else plain base64.
    pub async fn sign(
        &self,
        message: &str,
        keys: &KeyRepr,
        options: Option<&OutputOptions>,
    ) -> ProtoResult<String> {
        let multi = keys.is_multikey_flavored();
        let secret = convert::normalize_secret(&self.engine, keys).await?;
        let params = secret.algorithm().operation_params();

        debug!(family = %secret.algorithm().family(), multikey = multi, "signing");
        let raw = self.engine.sign(&params, &secret, message.as_bytes()).await?;
        Ok(encode_result(options, &raw, multi))
    }

    /// Verify a signature against the public half of `key`.
    ///
    /// Returns false, not an error, when the signature does not match. If
    /// the signature text is multibase-framed, its leading character decides
    /// the decoding regardless of the declared options.
    pub async fn verify(
        &self,
        message: &str,
        signature: &str,
        key: &KeyRepr,
        options: Option<&OutputOptions>,
    ) -> ProtoResult<bool> {
        let multi = key.is_multikey_flavored();
        let public = convert::normalize_public(&self.engine, key).await?;
        let params = public.algorithm().operation_params();

        let raw = decode_result(options, signature, multi)?;
        Ok(self
            .engine
            .verify(&params, &public, &raw, message.as_bytes())
            .await?)
    }

    /// Encrypt a message for the public half of `key`. Multikey conventions
    /// are signature-only: a Multikey or Multibase key is rejected before
    /// the engine is invoked.
    pub async fn encrypt(
        &self,
        message: &str,
        key: &KeyRepr,
        options: Option<&OutputOptions>,
    ) -> ProtoResult<String> {
        if key.is_multikey_flavored() {
            return Err(ProtoError::MultikeyForEncryption);
        }
        let public = convert::normalize_public(&self.engine, key).await?;
        let params = public.algorithm().operation_params();

        debug!(family = %public.algorithm().family(), "encrypting");
        let raw = self.engine.encrypt(&params, &public, message.as_bytes()).await?;
        Ok(encode_result(options, &raw, false))
    }

    /// Decrypt a ciphertext with the secret half of `key`. The plaintext is
    /// returned as UTF-8 text.
    pub async fn decrypt(
        &self,
        ciphertext: &str,
        key: &KeyRepr,
        options: Option<&OutputOptions>,
    ) -> ProtoResult<String> {
        if key.is_multikey_flavored() {
            return Err(ProtoError::MultikeyForEncryption);
        }
        let secret = convert::normalize_secret(&self.engine, key).await?;
        let params = secret.algorithm().operation_params();

        let raw = decode_result(options, ciphertext, false)?;
        let plaintext = self.engine.decrypt(&params, &secret, &raw).await?;
        String::from_utf8(plaintext).map_err(|_| {
            ProtoError::Core(crosskey_core::CoreError::Decryption(
                "plaintext is not valid UTF-8".into(),
            ))
        })
    }

    /// Hash a string, returning the digest in hexadecimal. Defaults to
    /// SHA-256.
    pub async fn hash(
        &self,
        input: &str,
        algorithm: Option<HashAlgorithm>,
    ) -> ProtoResult<String> {
        let algorithm = algorithm.unwrap_or_default();
        let digest = self.engine.digest(algorithm, input.as_bytes()).await?;
        Ok(hex::encode(digest))
    }
}
