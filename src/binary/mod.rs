//! Types for parsing the binary form
//!
//! The binary form is a stream of little-endian 16 bit opcodes, each
//! followed by an opcode-specific payload. Anything that is not a structural
//! opcode is a token id that the caller's dictionary turns back into a field
//! name; savegame dictionaries are incomplete by design, so unknown ids fall
//! back to their decimal spelling.
//!
//! Two quirks deserve a call-out. Rational numbers come in two fixed-point
//! encodings rather than IEEE-754, and dates are hidden inside ordinary
//! signed integers as total hours since year -5000 (see
//! [Date::from_binary](crate::Date::from_binary)).

mod lexer;
mod parser;
mod resolver;

pub use self::lexer::{LexemeId, Token};
pub use self::parser::{load_binary, parse_binary};
pub use self::resolver::{EmptyTokenResolver, TokenResolver};

/// Decodes the Q16.16 fixed-point payload of the 64 bit float opcode,
/// truncated to five decimal places the way the game prints them
///
/// ```
/// use moltke::binary::decode_q16_16;
/// assert_eq!(decode_q16_16(0x0008_4000), 16.5);
/// assert_eq!(decode_q16_16(0x0000_e4c7), 1.78732);
/// ```
#[inline]
pub fn decode_q16_16(n: i32) -> f64 {
    ((f64::from(n) * 2.0 / 65536.0) * 100_000.0).floor() / 100_000.0
}

/// Decodes the thousandths payload of the 32 bit float opcode
///
/// ```
/// use moltke::binary::decode_fixed_point;
/// assert_eq!(decode_fixed_point(1500), 1.5);
/// assert_eq!(decode_fixed_point(-1000), -1.0);
/// ```
#[inline]
pub fn decode_fixed_point(n: i32) -> f64 {
    f64::from(n) / 1000.0
}
