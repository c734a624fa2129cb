//! Types for parsing and writing the plaintext form
//!
//! The text form is a sequence of `key=value` pairs where values may be
//! scalars, `{ .. }` containers, or colour blocks. Whether a container is an
//! array or an object cannot be told from its opening brace; the parser
//! decides by looking at the bytes just after it.

mod parser;
mod writer;

pub use self::writer::{save, to_string, to_vec, TextWriter};

use crate::{Error, Value};
use std::io::Read;

/// Parses plaintext data from a reader into a value tree
///
/// The stream must hold raw data: when a format header (eg: `EU4txt`) sits
/// alone on the first line it is skipped, but no header validation happens
/// here. Use [load](crate::load) to validate headers and sniff containers.
///
/// ```
/// use moltke::{parse_text, Value};
///
/// let tree = parse_text(&b"foo=bar"[..])?;
/// assert_eq!(tree.get("foo")?.as_str()?, "bar");
/// # Ok::<(), moltke::Error>(())
/// ```
pub fn parse_text<R: Read>(reader: R) -> Result<Value, Error> {
    parser::TextParser::new(reader).parse()
}

/// Parses a string of plaintext data into a value tree
///
/// Convenience over [parse_text] for data already in memory. The string's
/// ascii subset is what the format uses for its syntax, so this is
/// equivalent to parsing the string's bytes.
pub fn parse_string(text: &str) -> Result<Value, Error> {
    parse_text(text.as_bytes())
}
