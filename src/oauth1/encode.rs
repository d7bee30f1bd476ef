//! RFC 3986 percent-encoding as required by RFC 5849 section 3.6.

// std
use std::str::Utf8Error;
// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
// self
use crate::_prelude::*;

/// Everything except the unreserved characters `A-Z a-z 0-9 - . _ ~` is escaped.
pub const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes `input` with upper-case hex digits. Spaces become `%20`, never `+`.
pub fn percent_encode(input: &str) -> Cow<'_, str> {
	utf8_percent_encode(input, OAUTH_ENCODE_SET).into()
}

/// Reverses [`percent_encode`].
pub fn percent_decode(input: &str) -> Result<Cow<'_, str>, Utf8Error> {
	percent_decode_str(input).decode_utf8()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unreserved_characters_pass_through() {
		assert_eq!(percent_encode("AZaz09-._~"), "AZaz09-._~");
	}

	#[test]
	fn reserved_characters_are_escaped() {
		assert_eq!(percent_encode("a b+c&d=e/f"), "a%20b%2Bc%26d%3De%2Ff");
		assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
		assert_eq!(percent_encode("é"), "%C3%A9");
		assert_eq!(percent_encode("*!'()"), "%2A%21%27%28%29");
	}

	#[test]
	fn decoding_round_trips() {
		for input in ["plain", "a b+c&d=e/f?g#h", "100% ~ok~", "ünïcødé ✓", "", "%41"] {
			let encoded = percent_encode(input);

			assert_eq!(percent_decode(&encoded).expect("Encoded text should decode."), input);
			assert_eq!(
				percent_encode(&percent_decode(&encoded).expect("Encoded text should decode.")),
				encoded,
				"Encoding must be canonical for {input:?}."
			);
		}
	}
}
