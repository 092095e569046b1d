//! Output codec policy.
//!
//! Byte results (signatures, ciphertexts) leave the system as text, either
//! plain base-N or multibase-framed. Which base and which framing are
//! caller options with defaults that depend on whether the operation's keys
//! were Multikey-flavored: base58 + multibase in a Multikey context, base64 +
//! plain otherwise.
//!
//! The one base64 alphabet in this workspace is base64url-no-pad; base58 is
//! base58-btc. Multibase framing uses the corresponding indicator characters
//! `u` and `z`.

use crate::error::{ProtoError, ProtoResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Multibase indicator for base58-btc.
pub const BASE58_PREFIX: char = 'z';
/// Multibase indicator for base64url-no-pad.
pub const BASE64_PREFIX: char = 'u';

/// Base encoding alternatives for produced byte strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseEncoding {
    #[serde(rename = "base64")]
    Base64,
    #[serde(rename = "base58")]
    Base58,
}

/// Framing of the final text: bare base-N, or multibase with its indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "plain")]
    Plain,
    #[serde(rename = "multibase")]
    Multibase,
}

/// Caller-supplied output options; unset fields take context defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<BaseEncoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

/// Fully-populated options after default resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub encoding: BaseEncoding,
    pub format: OutputFormat,
}

impl ResolvedOptions {
    /// Resolve unset fields against the context defaults: Multikey contexts
    /// default to base58 + multibase, everything else to base64 + plain.
    pub fn resolve(options: Option<&OutputOptions>, multikey_context: bool) -> Self {
        let defaults = if multikey_context {
            ResolvedOptions { encoding: BaseEncoding::Base58, format: OutputFormat::Multibase }
        } else {
            ResolvedOptions { encoding: BaseEncoding::Base64, format: OutputFormat::Plain }
        };
        match options {
            None => defaults,
            Some(opts) => ResolvedOptions {
                encoding: opts.encoding.unwrap_or(defaults.encoding),
                format: opts.format.unwrap_or(defaults.format),
            },
        }
    }
}

fn base_encode(encoding: BaseEncoding, bytes: &[u8]) -> String {
    match encoding {
        BaseEncoding::Base58 => bs58::encode(bytes).into_string(),
        BaseEncoding::Base64 => URL_SAFE_NO_PAD.encode(bytes),
    }
}

fn base_decode(encoding: BaseEncoding, text: &str) -> ProtoResult<Vec<u8>> {
    match encoding {
        BaseEncoding::Base58 => Ok(bs58::decode(text).into_vec()?),
        BaseEncoding::Base64 => Ok(URL_SAFE_NO_PAD.decode(text)?),
    }
}

/// Encode a byte result per the options, resolving defaults against the
/// Multikey context. Multibase format prepends the indicator character.
pub fn encode_result(
    options: Option<&OutputOptions>,
    bytes: &[u8],
    multikey_context: bool,
) -> String {
    let resolved = ResolvedOptions::resolve(options, multikey_context);
    let encoded = base_encode(resolved.encoding, bytes);
    match resolved.format {
        OutputFormat::Plain => encoded,
        OutputFormat::Multibase => {
            let prefix = match resolved.encoding {
                BaseEncoding::Base58 => BASE58_PREFIX,
                BaseEncoding::Base64 => BASE64_PREFIX,
            };
            format!("{prefix}{encoded}")
        }
    }
}

/// Decode a text result per the options. In multibase format the leading
/// character is authoritative and the declared encoding is ignored; an
/// unrecognized leading character is an error.
pub fn decode_result(
    options: Option<&OutputOptions>,
    text: &str,
    multikey_context: bool,
) -> ProtoResult<Vec<u8>> {
    let resolved = ResolvedOptions::resolve(options, multikey_context);
    match resolved.format {
        OutputFormat::Plain => base_decode(resolved.encoding, text),
        OutputFormat::Multibase => match text.chars().next() {
            Some(BASE58_PREFIX) => base_decode(BaseEncoding::Base58, &text[1..]),
            Some(BASE64_PREFIX) => base_decode(BaseEncoding::Base64, &text[1..]),
            Some(other) => Err(ProtoError::InvalidMultibasePrefix(other)),
            None => Err(ProtoError::InvalidMultibasePrefix('\0')),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_context() {
        let multikey = ResolvedOptions::resolve(None, true);
        assert_eq!(multikey.encoding, BaseEncoding::Base58);
        assert_eq!(multikey.format, OutputFormat::Multibase);

        let plain = ResolvedOptions::resolve(None, false);
        assert_eq!(plain.encoding, BaseEncoding::Base64);
        assert_eq!(plain.format, OutputFormat::Plain);
    }

    #[test]
    fn partial_options_keep_context_defaults_for_the_rest() {
        let opts = OutputOptions { encoding: Some(BaseEncoding::Base64), format: None };
        let resolved = ResolvedOptions::resolve(Some(&opts), true);
        assert_eq!(resolved.encoding, BaseEncoding::Base64);
        assert_eq!(resolved.format, OutputFormat::Multibase);
    }

    #[test]
    fn multibase_prefixes() {
        let bytes = [0xDE, 0xAD, 0xBE, 0xEF];
        let opts = OutputOptions { encoding: None, format: Some(OutputFormat::Multibase) };

        let b58 = encode_result(
            Some(&OutputOptions { encoding: Some(BaseEncoding::Base58), ..opts }),
            &bytes,
            false,
        );
        assert!(b58.starts_with('z'));

        let b64 = encode_result(
            Some(&OutputOptions { encoding: Some(BaseEncoding::Base64), ..opts }),
            &bytes,
            false,
        );
        assert!(b64.starts_with('u'));
        assert_eq!(&b64[1..], "3q2-7w"); // base64url, no padding
    }

    #[test]
    fn multibase_decode_ignores_declared_encoding() {
        let bytes = b"payload".to_vec();
        // Encoded as base58 multibase...
        let text = encode_result(None, &bytes, true);
        assert!(text.starts_with('z'));

        // ...decodes fine even when the caller declares base64: the leading
        // character wins.
        let opts = OutputOptions {
            encoding: Some(BaseEncoding::Base64),
            format: Some(OutputFormat::Multibase),
        };
        assert_eq!(decode_result(Some(&opts), &text, false).unwrap(), bytes);
    }

    #[test]
    fn unknown_multibase_prefix_is_an_error() {
        let opts = OutputOptions { encoding: None, format: Some(OutputFormat::Multibase) };
        let err = decode_result(Some(&opts), "Qabcdef", false).unwrap_err();
        assert!(matches!(err, ProtoError::InvalidMultibasePrefix('Q')));

        let err = decode_result(Some(&opts), "", false).unwrap_err();
        assert!(matches!(err, ProtoError::InvalidMultibasePrefix('\0')));
    }

    #[test]
    fn empty_input_round_trips() {
        for multi in [false, true] {
            let text = encode_result(None, &[], multi);
            assert_eq!(decode_result(None, &text, multi).unwrap(), Vec::<u8>::new());
        }
    }
}
