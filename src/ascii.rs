use crate::util::le_u64;

/// Determines if the given data is ascii. Processes the data a word at a time,
/// which makes this several times faster than the byte-at-a-time check in the
/// standard library for the string lengths seen in save files.
pub(crate) fn is_ascii(data: &[u8]) -> bool {
    let mut chunks = data.chunks_exact(8);
    let res = chunks.all(|x| le_u64(x) & 0x8080_8080_8080_8080 == 0);
    res & chunks.remainder().is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_is_ascii() {
        assert!(is_ascii(b"abcdefgh12345678"));
        assert!(!is_ascii(&[b'a', 0xff, b'b']));
        assert!(is_ascii(b""));
    }

    #[quickcheck]
    fn chunks_by_byte_equality(data: Vec<u8>) -> bool {
        data.is_ascii() == is_ascii(&data)
    }
}
