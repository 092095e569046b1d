//! Encode/decode round-trip property: for every byte sequence, every option
//! combination, and both Multikey contexts, decoding an encoded value gives
//! the original bytes back.

use crosskey_proto::{decode_result, encode_result, BaseEncoding, OutputFormat, OutputOptions};
use proptest::prelude::*;

fn all_options() -> Vec<Option<OutputOptions>> {
    let mut combos = vec![None];
    for encoding in [None, Some(BaseEncoding::Base64), Some(BaseEncoding::Base58)] {
        for format in [None, Some(OutputFormat::Plain), Some(OutputFormat::Multibase)] {
            combos.push(Some(OutputOptions { encoding, format }));
        }
    }
    combos
}

proptest! {
    #[test]
    fn prop_encode_decode_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        for options in all_options() {
            for multikey_context in [false, true] {
                let encoded = encode_result(options.as_ref(), &bytes, multikey_context);
                let decoded = decode_result(options.as_ref(), &encoded, multikey_context)
                    .expect("decoding our own encoding");
                prop_assert_eq!(&decoded, &bytes);
            }
        }
    }
}
