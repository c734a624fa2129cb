use crate::{ascii::is_ascii, Windows1252Encoding};
use std::borrow::Cow;
use std::error;
use std::fmt;

/// An error while converting scalar data to a narrower type
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarError {
    /// Input was not a decimal number in a shape the save format produces
    InvalidNumber(String),

    /// Input was not `yes` or `no`
    InvalidBool(String),

    /// Number did not fit in the 32 bit accumulator
    Overflow(String),
}

impl fmt::Display for ScalarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScalarError::InvalidNumber(x) => write!(f, "is not a valid number: {}", x),
            ScalarError::InvalidBool(x) => write!(f, "is not a valid bool: {}", x),
            ScalarError::Overflow(x) => write!(f, "caused an overflow: {}", x),
        }
    }
}

impl error::Error for ScalarError {}

/// Single value encapsulating windows-1252 data
#[derive(PartialEq, Eq, Copy, Clone)]
pub struct Scalar<'a> {
    data: &'a [u8],
}

impl<'a> Scalar<'a> {
    /// Create a new scalar backed by a windows-1252 encoded byte slice
    pub fn new(data: &'a [u8]) -> Scalar<'a> {
        Scalar { data }
    }

    /// View the underlying windows-1252 encoded data
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Try converting the scalar to a boolean. Only the exact spellings `yes`
    /// and `no` qualify.
    pub fn to_bool(&self) -> Result<bool, ScalarError> {
        to_bool(self.data)
    }

    /// Try converting the scalar to a number.
    ///
    /// The save format writes decimals with exactly three or exactly five
    /// fractional digits, and nothing else: no scientific notation, no other
    /// fraction widths, no trailing garbage.
    ///
    /// ```
    /// use moltke::Scalar;
    ///
    /// assert_eq!(Scalar::new(b"-1.500").to_number(), Ok(-1.5));
    /// assert!(Scalar::new(b"1.0000").to_number().is_err());
    /// assert!(Scalar::new(b"1e10").to_number().is_err());
    /// ```
    pub fn to_number(&self) -> Result<f64, ScalarError> {
        to_number(self.data)
    }

    /// Convert scalar data into utf-8, allocating for non-ascii input
    pub fn to_utf8(&self) -> Cow<'a, str> {
        Windows1252Encoding::decode(self.data)
    }

    /// Returns if the scalar contains only ascii values
    pub fn is_ascii(&self) -> bool {
        is_ascii(self.data)
    }
}

impl fmt::Debug for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar {{ {} }}", self)
    }
}

impl fmt::Display for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_utf8())
    }
}

#[inline]
fn to_bool(d: &[u8]) -> Result<bool, ScalarError> {
    match d {
        b"yes" => Ok(true),
        b"no" => Ok(false),
        x => Err(ScalarError::InvalidBool(
            Windows1252Encoding::decode(x).into_owned(),
        )),
    }
}

/// Accumulate ascii digits into the 32 bit accumulator the format fits in
#[inline]
fn accumulate(original: &[u8], digits: &[u8]) -> Result<u32, ScalarError> {
    let invalid = || ScalarError::InvalidNumber(Windows1252Encoding::decode(original).into_owned());
    if digits.is_empty() {
        return Err(invalid());
    }

    let mut result: u32 = 0;
    for &c in digits {
        let digit = c.wrapping_sub(b'0');
        if digit > 9 {
            return Err(invalid());
        }

        result = result
            .checked_mul(10)
            .and_then(|x| x.checked_add(u32::from(digit)))
            .ok_or_else(|| {
                ScalarError::Overflow(Windows1252Encoding::decode(original).into_owned())
            })?;
    }

    Ok(result)
}

#[inline]
fn split_sign(d: &[u8]) -> (f64, &[u8]) {
    match d.split_first() {
        Some((b'-', rest)) => (-1.0, rest),
        _ => (1.0, d),
    }
}

#[inline]
fn to_number(d: &[u8]) -> Result<f64, ScalarError> {
    let (sign, magnitude) = split_sign(d);
    match memchr::memchr(b'.', magnitude) {
        Some(idx) => {
            let frac = &magnitude[idx + 1..];
            let divisor = match frac.len() {
                3 => 1_000.0,
                5 => 100_000.0,
                _ => {
                    return Err(ScalarError::InvalidNumber(
                        Windows1252Encoding::decode(d).into_owned(),
                    ));
                }
            };

            let lead = accumulate(d, &magnitude[..idx])?;
            let trail = accumulate(d, frac)?;
            Ok(sign * (f64::from(lead) + f64::from(trail) / divisor))
        }
        None => {
            let lead = accumulate(d, magnitude)?;
            Ok(sign * f64::from(lead))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_to_string() {
        assert_eq!((Scalar::new(&[255][..])).to_string(), "ÿ".to_string());
        assert_eq!((Scalar::new(&[138][..])).to_string(), "Š".to_string());
        assert_eq!(
            (Scalar::new(b"hello world")).to_string(),
            "hello world".to_string()
        );
        assert_eq!(
            (Scalar::new(&[104, 105, 129, 138][..])).to_string(),
            "hi\u{81}Š".to_string()
        );
    }

    #[test]
    fn scalar_to_bool() {
        assert_eq!(Scalar::new(b"yes").to_bool(), Ok(true));
        assert_eq!(Scalar::new(b"no").to_bool(), Ok(false));
        assert!(Scalar::new(b"Yes").to_bool().is_err());
        assert!(Scalar::new(b"true").to_bool().is_err());
    }

    #[test]
    fn scalar_to_number() {
        assert_eq!(Scalar::new(b"0").to_number(), Ok(0.0));
        assert_eq!(Scalar::new(b"1").to_number(), Ok(1.0));
        assert_eq!(Scalar::new(b"-1").to_number(), Ok(-1.0));
        assert_eq!(Scalar::new(b"-10000").to_number(), Ok(-10000.0));
        assert_eq!(Scalar::new(b"10000").to_number(), Ok(10000.0));
        assert_eq!(Scalar::new(b"20405029").to_number(), Ok(20405029.0));
        assert_eq!(Scalar::new(b"0.504").to_number(), Ok(0.504));
        assert_eq!(Scalar::new(b"2.000").to_number(), Ok(2.0));
        assert_eq!(Scalar::new(b"1.00125").to_number(), Ok(1.00125));
        assert_eq!(Scalar::new(b"-1.50000").to_number(), Ok(-1.5));
        assert_eq!(Scalar::new(b"-4.000").to_number(), Ok(-4.0));
    }

    #[test]
    fn scalar_number_rejects_foreign_shapes() {
        assert!(Scalar::new(b"").to_number().is_err());
        assert!(Scalar::new(b"-").to_number().is_err());
        assert!(Scalar::new(b".").to_number().is_err());
        assert!(Scalar::new(b"1.0").to_number().is_err());
        assert!(Scalar::new(b"1.00").to_number().is_err());
        assert!(Scalar::new(b"1.0000").to_number().is_err());
        assert!(Scalar::new(b"1.000000").to_number().is_err());
        assert!(Scalar::new(b"1e10").to_number().is_err());
        assert!(Scalar::new(b"1.a.1").to_number().is_err());
        assert!(Scalar::new(b"1.000x").to_number().is_err());
        assert!(Scalar::new(b"--1.000").to_number().is_err());
    }

    #[test]
    fn scalar_number_overflow() {
        assert!(matches!(
            Scalar::new(b"88888888888888888888").to_number(),
            Err(ScalarError::Overflow(_))
        ));
        assert!(matches!(
            Scalar::new(b"4294967296").to_number(),
            Err(ScalarError::Overflow(_))
        ));
        assert_eq!(Scalar::new(b"4294967295").to_number(), Ok(4294967295.0));
    }
}
