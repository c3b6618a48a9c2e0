//! Payloads built from user-supplied text or hex (format C).

use crate::escape::{escape_bytes, push_escape};
use gatekeep_core::{Error, Result};
use rand::Rng;
use tracing::debug;

/// Escaped form of U+FFFD, left behind by input that failed to decode upstream.
pub const REPLACEMENT_MARKER: &str = "\\xfffd";

/// Classified user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadInput<'a> {
    /// Only hex digits, optionally separated by spaces.
    Hex(&'a str),
    /// Anything else.
    Text(&'a str),
}

impl<'a> PayloadInput<'a> {
    /// Classifies input. Empty input (after trimming) is rejected.
    pub fn classify(input: &'a str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidArgument(
                "provide a text or hex string to build the payload from".to_string(),
            ));
        }

        let is_hex = input
            .chars()
            .filter(|c| *c != ' ')
            .all(|c| c.is_ascii_hexdigit());

        Ok(if is_hex {
            PayloadInput::Hex(input)
        } else {
            PayloadInput::Text(input)
        })
    }
}

/// Decodes a hex string, ignoring spaces.
pub fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let compact: String = input.chars().filter(|c| *c != ' ').collect();
    if compact.len() % 2 != 0 {
        return Err(Error::OddLengthHex(compact.len()));
    }

    hex::decode(&compact).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => {
            Error::InvalidHexDigit { digit: c, index }
        }
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            Error::OddLengthHex(compact.len())
        }
    })
}

/// Renders text one character per escape.
///
/// Characters up to U+00FF render as their own byte. U+FFFD renders as the
/// replacement marker. Anything else cannot be represented in one byte and
/// is replaced by a random byte.
fn escape_text<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut out = String::with_capacity(text.len() * 4);
    for c in text.chars() {
        match u8::try_from(u32::from(c)) {
            Ok(byte) => push_escape(&mut out, byte),
            Err(_) if c == char::REPLACEMENT_CHARACTER => out.push_str(REPLACEMENT_MARKER),
            Err(_) => push_escape(&mut out, rng.r#gen()),
        }
    }
    out
}

/// Replaces every replacement marker with a random `\xHH` escape.
pub fn repair_replacement_markers<R: Rng + ?Sized>(escaped: &str, rng: &mut R) -> String {
    let mut parts = escaped.split(REPLACEMENT_MARKER);
    let mut out = String::with_capacity(escaped.len());
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for part in parts {
        push_escape(&mut out, rng.r#gen());
        out.push_str(part);
    }
    out
}

/// Format C: escapes hex-decoded bytes or text, then repairs replacement markers.
pub fn from_input<R: Rng + ?Sized>(input: &str, rng: &mut R) -> Result<String> {
    let escaped = match PayloadInput::classify(input)? {
        PayloadInput::Hex(hex) => escape_bytes(&decode_hex(hex)?),
        PayloadInput::Text(text) => escape_text(text, rng),
    };

    let repaired = repair_replacement_markers(&escaped, rng);
    debug!(input_len = input.len(), output_len = repaired.len(), "Generated input payload");
    Ok(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_classify() {
        assert_eq!(PayloadInput::classify("de ad").unwrap(), PayloadInput::Hex("de ad"));
        assert_eq!(PayloadInput::classify("hello").unwrap(), PayloadInput::Text("hello"));
        assert!(PayloadInput::classify("   ").is_err());
    }

    #[test]
    fn test_decode_hex_with_spaces() {
        assert_eq!(decode_hex("48 65 6C").unwrap(), vec![0x48, 0x65, 0x6c]);
    }

    #[test]
    fn test_decode_hex_invalid_digit() {
        match decode_hex("4g") {
            Err(Error::InvalidHexDigit { digit, index }) => {
                assert_eq!(digit, 'g');
                assert_eq!(index, 1);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_escape_text_latin1() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(escape_text("Hi\u{e9}", &mut rng), "\\x48\\x69\\xe9");
    }

    #[test]
    fn test_escape_text_wide_char_becomes_one_byte() {
        let mut rng = StdRng::seed_from_u64(3);
        let out = escape_text("a\u{1F600}", &mut rng);
        assert!(out.starts_with("\\x61\\x"));
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn test_repair_replacement_markers() {
        let mut rng = StdRng::seed_from_u64(5);
        let repaired = repair_replacement_markers("\\x41\\xfffd\\x42\\xfffd", &mut rng);
        assert!(!repaired.contains(REPLACEMENT_MARKER));
        assert_eq!(repaired.len(), 16);
        assert!(repaired.starts_with("\\x41\\x"));
        assert_eq!(&repaired[8..12], "\\x42");
    }
}
