use crate::{ascii::is_ascii, data::WINDOWS_1252};
use std::borrow::Cow;

/// Decodes bytes according to the windows-1252 code page
///
/// Both the text and binary forms store strings as windows-1252 data, so this
/// is the only decoder the crate needs.
///
/// ```
/// use moltke::Windows1252Encoding;
///
/// assert_eq!(Windows1252Encoding::decode(b"Common Sense"), "Common Sense");
/// assert_eq!(Windows1252Encoding::decode(b"\xff"), "ÿ");
/// assert_eq!(Windows1252Encoding::decode(b"\x8a"), "Š");
/// assert_eq!(Windows1252Encoding::decode(b"hi\x81\x8a"), "hi\u{81}Š");
/// ```
#[derive(Debug, Default, Copy, Clone)]
pub struct Windows1252Encoding;

impl Windows1252Encoding {
    /// Creates a new windows-1252 decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode text back into windows-1252 bytes, borrowing when the input is
    /// ascii. Characters outside the code page degrade to `?`, which cannot
    /// happen for text produced by this crate's own decoder.
    pub fn encode(s: &str) -> Cow<'_, [u8]> {
        if s.is_ascii() {
            Cow::Borrowed(s.as_bytes())
        } else {
            Cow::Owned(s.chars().map(encode_char).collect())
        }
    }

    /// Decode windows-1252 data, borrowing when the input is ascii
    pub fn decode(data: &[u8]) -> Cow<'_, str> {
        if is_ascii(data) {
            // ascii is a subset of utf-8, so this is sound after the check
            debug_assert!(std::str::from_utf8(data).is_ok());
            let s = unsafe { std::str::from_utf8_unchecked(data) };
            Cow::Borrowed(s)
        } else {
            Cow::Owned(data.iter().map(|&x| WINDOWS_1252[usize::from(x)]).collect())
        }
    }
}

fn encode_char(c: char) -> u8 {
    if c.is_ascii() {
        return c as u8;
    }

    for (i, &x) in WINDOWS_1252.iter().enumerate().skip(128) {
        if x == c {
            return i as u8;
        }
    }

    b'?'
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_undefined_positions() {
        // Positions 81, 8D, 8F, 90, and 9D are unused by the code page proper,
        // but the Windows API maps them to the matching C1 control codes and
        // the reference decoder follows suit.
        let data = &[0x81, 0x8d, 0x8f, 0x90, 0x9d];
        let (cow, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(data);
        assert_eq!(Windows1252Encoding::decode(data), cow);
    }

    #[quickcheck]
    fn decode_equality(data: Vec<u8>) -> bool {
        let (cow, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(&data);
        cow == Windows1252Encoding::decode(&data)
    }

    #[quickcheck]
    fn encode_inverts_decode(data: Vec<u8>) -> bool {
        let decoded = Windows1252Encoding::decode(&data);
        Windows1252Encoding::encode(&decoded).as_ref() == data.as_slice()
    }
}
