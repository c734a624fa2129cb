use crate::{
    binary::{decode_fixed_point, decode_q16_16},
    util::get_split,
    Scalar,
};

/// The 16 bit opcode introducing each lexeme of the binary form
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct LexemeId(pub u16);

impl LexemeId {
    /// A binary '='
    pub const EQUAL: LexemeId = LexemeId::new(0x0001);

    /// A binary '{' (open group)
    pub const OPEN: LexemeId = LexemeId::new(0x0003);

    /// A binary '}' (end group)
    pub const CLOSE: LexemeId = LexemeId::new(0x0004);

    /// A binary 32 bit signed integer
    pub const I32: LexemeId = LexemeId::new(0x000c);

    /// A 32 bit payload holding thousandths
    pub const F32: LexemeId = LexemeId::new(0x000d);

    /// A binary boolean carried in one payload byte
    pub const BOOL: LexemeId = LexemeId::new(0x000e);

    /// A length-prefixed string that is typically quoted in the text form
    pub const QUOTED: LexemeId = LexemeId::new(0x000f);

    /// A binary 32 bit unsigned integer
    pub const U32: LexemeId = LexemeId::new(0x0014);

    /// A length-prefixed string that is typically without quotes
    pub const UNQUOTED: LexemeId = LexemeId::new(0x0017);

    /// A 64 bit payload holding a Q16.16 fixed-point number
    pub const F64: LexemeId = LexemeId::new(0x0167);

    /// A payloadless boolean true
    pub const BOOL_TRUE: LexemeId = LexemeId::new(0x284b);

    /// A payloadless boolean false
    pub const BOOL_FALSE: LexemeId = LexemeId::new(0x284c);

    /// Construct a new [LexemeId] from a 16 bit value
    #[inline]
    pub const fn new(x: u16) -> Self {
        LexemeId(x)
    }

    /// Identifies if the given ID matches none of the predefined [LexemeId]
    /// constants and is thus a token id to run through the dictionary.
    #[inline]
    pub const fn is_id(&self) -> bool {
        !matches!(
            *self,
            LexemeId::EQUAL
                | LexemeId::OPEN
                | LexemeId::CLOSE
                | LexemeId::I32
                | LexemeId::F32
                | LexemeId::BOOL
                | LexemeId::QUOTED
                | LexemeId::U32
                | LexemeId::UNQUOTED
                | LexemeId::F64
                | LexemeId::BOOL_TRUE
                | LexemeId::BOOL_FALSE
        )
    }
}

/// Lexical error: the only way a lexeme fails to read is the data ending
/// too soon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LexError;

#[inline]
pub(crate) fn read_id(data: &[u8]) -> Result<(LexemeId, &[u8]), LexError> {
    let (head, rest) = get_split::<2>(data).ok_or(LexError)?;
    Ok((LexemeId::new(u16::from_le_bytes(head)), rest))
}

#[inline]
pub(crate) fn read_string(data: &[u8]) -> Result<(Scalar, &[u8]), LexError> {
    let (head, rest) = get_split::<2>(data).ok_or(LexError)?;
    let text_len = usize::from(u16::from_le_bytes(head));
    if text_len <= rest.len() {
        let (text, rest) = rest.split_at(text_len);
        Ok((Scalar::new(text), rest))
    } else {
        Err(LexError)
    }
}

#[inline]
pub(crate) fn read_bool(data: &[u8]) -> Result<(bool, &[u8]), LexError> {
    let (&first, rest) = data.split_first().ok_or(LexError)?;
    Ok((first != 0, rest))
}

#[inline]
pub(crate) fn read_u32(data: &[u8]) -> Result<(u32, &[u8]), LexError> {
    let (head, rest) = get_split::<4>(data).ok_or(LexError)?;
    Ok((u32::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_i32(data: &[u8]) -> Result<(i32, &[u8]), LexError> {
    let (head, rest) = get_split::<4>(data).ok_or(LexError)?;
    Ok((i32::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_f32(data: &[u8]) -> Result<(f64, &[u8]), LexError> {
    let (n, rest) = read_i32(data)?;
    Ok((decode_fixed_point(n), rest))
}

#[inline]
pub(crate) fn read_f64(data: &[u8]) -> Result<(f64, &[u8]), LexError> {
    let (head, rest) = get_split::<8>(data).ok_or(LexError)?;
    // Only the leading 4 bytes carry data; the trailing 4 are padding
    let mut fixed = [0u8; 4];
    fixed.copy_from_slice(&head[..4]);
    Ok((decode_q16_16(i32::from_le_bytes(fixed)), rest))
}

/// A single lexeme of the binary form with its payload decoded
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Token<'a> {
    /// '{'
    Open,

    /// '}'
    Close,

    /// '='
    Equal,

    /// 32 bit signed integer
    I32(i32),

    /// 32 bit unsigned integer
    U32(u32),

    /// boolean
    Bool(bool),

    /// text that is typically quoted
    Quoted(Scalar<'a>),

    /// text that is typically not quoted
    Unquoted(Scalar<'a>),

    /// decoded thousandths payload
    F32(f64),

    /// decoded Q16.16 payload
    F64(f64),

    /// token id to resolve through the caller's dictionary
    Id(u16),
}

impl Token<'_> {
    /// A short name for error messages
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Token::Open => "open group",
            Token::Close => "end group",
            Token::Equal => "equals",
            Token::I32(_) => "int",
            Token::U32(_) => "uint",
            Token::Bool(_) => "bool",
            Token::Quoted(_) => "quoted string",
            Token::Unquoted(_) => "unquoted string",
            Token::F32(_) => "float",
            Token::F64(_) => "float",
            Token::Id(_) => "token",
        }
    }
}

#[inline]
pub(crate) fn read_token(data: &[u8]) -> Result<(Token, &[u8]), LexError> {
    let (id, data) = read_id(data)?;
    match id {
        LexemeId::EQUAL => Ok((Token::Equal, data)),
        LexemeId::OPEN => Ok((Token::Open, data)),
        LexemeId::CLOSE => Ok((Token::Close, data)),
        LexemeId::I32 => read_i32(data).map(|(x, d)| (Token::I32(x), d)),
        LexemeId::F32 => read_f32(data).map(|(x, d)| (Token::F32(x), d)),
        LexemeId::BOOL => read_bool(data).map(|(x, d)| (Token::Bool(x), d)),
        LexemeId::QUOTED => read_string(data).map(|(x, d)| (Token::Quoted(x), d)),
        LexemeId::U32 => read_u32(data).map(|(x, d)| (Token::U32(x), d)),
        LexemeId::UNQUOTED => read_string(data).map(|(x, d)| (Token::Unquoted(x), d)),
        LexemeId::F64 => read_f64(data).map(|(x, d)| (Token::F64(x), d)),
        LexemeId::BOOL_TRUE => Ok((Token::Bool(true), data)),
        LexemeId::BOOL_FALSE => Ok((Token::Bool(false), data)),
        LexemeId(id) => Ok((Token::Id(id), data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_q16_16_vectors() {
        let (x, rest) = read_f64(&[0x00, 0x40, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(x, 16.5);
        assert!(rest.is_empty());

        let (x, _) = read_f64(&[0xc7, 0xe4, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(x, 1.78732);
    }

    #[test]
    fn test_thousandths() {
        let (x, _) = read_f32(&[0xe8, 0x03, 0x00, 0x00]).unwrap();
        assert_eq!(x, 1.0);

        let (x, _) = read_f32(&[0x18, 0xfc, 0xff, 0xff]).unwrap();
        assert_eq!(x, -1.0);
    }

    #[test]
    fn test_string_reads() {
        let data = [0x03, 0x00, b'E', b'N', b'G', 0xff];
        let (s, rest) = read_string(&data).unwrap();
        assert_eq!(s.as_bytes(), b"ENG");
        assert_eq!(rest, &[0xff]);

        assert!(read_string(&[0x04, 0x00, b'E', b'N', b'G']).is_err());
    }

    #[test]
    fn test_synthetic_bools() {
        let (token, _) = read_token(&[0x4b, 0x28]).unwrap();
        assert_eq!(token, Token::Bool(true));
        let (token, _) = read_token(&[0x4c, 0x28]).unwrap();
        assert_eq!(token, Token::Bool(false));
    }

    #[test]
    fn test_unknown_id_is_token() {
        let (token, _) = read_token(&[0xdd, 0xdd]).unwrap();
        assert_eq!(token, Token::Id(0xdddd));
        assert!(LexemeId::new(0xdddd).is_id());
        assert!(!LexemeId::OPEN.is_id());
    }
}
