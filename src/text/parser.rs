use crate::{
    data::{is_boundary, is_whitespace},
    errors::ErrorKind,
    reader::PeekReader,
    value::Rgb,
    Date, Error, Scalar, Value, Windows1252Encoding,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::rc::Rc;

/// No token in the wild exceeds this; the reference tooling makes the same
/// assumption.
const SCRATCH_LEN: usize = 256;

/// What ends the object currently being accumulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopAt {
    Close,
    Eof,
}

/// Recursive descent parser for the plaintext form
///
/// The grammar cannot be parsed by token kind alone: `{` opens an object, an
/// array, or a stray placeholder block, and only a byte of look-ahead after
/// the first inner token tells them apart. All of that look-ahead funnels
/// through the single-byte peek of the underlying source.
pub(crate) struct TextParser<R> {
    source: PeekReader<R>,
    scratch: [u8; SCRATCH_LEN],
    scratch_len: usize,

    // Hot savegames repeat the same few thousand tokens millions of times, so
    // both the decoded strings and the narrowed values are interned per
    // parse. A 64 bit hash over at most 200k distinct tokens makes collisions
    // a non-concern in this domain.
    strings: HashMap<u64, Rc<str>>,
    values: HashMap<u64, Value>,
}

impl<R: Read> TextParser<R> {
    pub(crate) fn new(reader: R) -> Self {
        TextParser {
            source: PeekReader::new(reader),
            scratch: [0; SCRATCH_LEN],
            scratch_len: 0,
            strings: HashMap::new(),
            values: HashMap::new(),
        }
    }

    /// Parses the whole stream into the top-level record
    pub(crate) fn parse(mut self) -> Result<Value, Error> {
        self.skip_whitespace()?;
        if self.source.peek()?.is_none() {
            return Ok(Value::Record(Vec::new()));
        }

        self.read_token()?;
        match self.source.peek()? {
            // A keyword alone on the first line (eg: `EU4txt`) is a format
            // header, not data. Skip it and the rest of the file is pairs.
            Some(b'\r') | Some(b'\n') => {
                let mut pairs = Vec::new();
                self.parse_object_rest(&mut pairs, StopAt::Eof)?;
                Ok(Value::Record(pairs))
            }
            _ => {
                let key = self.intern_token();
                self.expect_equals()?;
                self.parse_object(key, StopAt::Eof)
            }
        }
    }

    fn skip_whitespace(&mut self) -> Result<(), Error> {
        while let Some(b) = self.source.peek()? {
            if !is_whitespace(b) {
                break;
            }
            self.source.bump()?;
        }

        Ok(())
    }

    /// Fills the scratch buffer with the next bare token
    ///
    /// A bare token ends at whitespace, `}`, or end of stream. An equals sign
    /// also ends it, but only once the token is non-empty, which is what lets
    /// a lone `=` act as a key (`bar=a ==b` parses as two pairs).
    fn read_token(&mut self) -> Result<(), Error> {
        self.scratch_len = 0;
        while let Some(b) = self.source.peek()? {
            if is_boundary(b) && !(b == b'=' && self.scratch_len == 0) {
                break;
            }
            self.push_scratch(b)?;
            self.source.bump()?;
        }

        Ok(())
    }

    #[inline]
    fn push_scratch(&mut self, b: u8) -> Result<(), Error> {
        if self.scratch_len == SCRATCH_LEN {
            return Err(Error::new(ErrorKind::BufferFull));
        }

        self.scratch[self.scratch_len] = b;
        self.scratch_len += 1;
        Ok(())
    }

    /// Decodes the scratch buffer through the string cache
    fn intern_token(&mut self) -> Rc<str> {
        let hash = hash_bytes(&self.scratch[..self.scratch_len]);
        self.intern_scratch(hash)
    }

    fn intern_scratch(&mut self, hash: u64) -> Rc<str> {
        if let Some(s) = self.strings.get(&hash) {
            return Rc::clone(s);
        }

        let s: Rc<str> = match Windows1252Encoding::decode(&self.scratch[..self.scratch_len]) {
            Cow::Borrowed(x) => Rc::from(x),
            Cow::Owned(x) => Rc::from(x),
        };
        self.strings.insert(hash, Rc::clone(&s));
        s
    }

    /// Classifies the scratch buffer through the value cache: bools first,
    /// then numbers, then dates, and finally plain strings
    fn narrow_scratch(&mut self) -> Value {
        let hash = hash_bytes(&self.scratch[..self.scratch_len]);
        if let Some(v) = self.values.get(&hash) {
            return v.clone();
        }

        let data = &self.scratch[..self.scratch_len];
        let narrowed = match data {
            [b'y', b'e', b's'] => Some(Value::Bool(true)),
            [b'n', b'o'] => Some(Value::Bool(false)),
            _ => Scalar::new(data)
                .to_number()
                .ok()
                .map(Value::Number)
                .or_else(|| Date::parse(data).map(Value::Date)),
        };

        let value = match narrowed {
            Some(x) => x,
            None => Value::String(self.intern_scratch(hash)),
        };
        self.values.insert(hash, value.clone());
        value
    }

    /// Narrows the scratch buffer, treating `hsv` and `rgb` as colour block
    /// headers that consume the following `{ .. }`
    fn narrow_scratch_value(&mut self) -> Result<Value, Error> {
        match &self.scratch[..self.scratch_len] {
            [b'h', b's', b'v'] => self.parse_hsv(),
            [b'r', b'g', b'b'] => self.parse_rgb(),
            _ => Ok(self.narrow_scratch()),
        }
    }

    fn expect_equals(&mut self) -> Result<(), Error> {
        self.skip_whitespace()?;
        let offset = self.source.position();
        match self.source.bump()? {
            Some(b'=') => Ok(()),
            _ => Err(Error::new(ErrorKind::MissingEquals { offset })),
        }
    }

    fn expect_close(&mut self) -> Result<(), Error> {
        let offset = self.source.position();
        match self.source.bump()? {
            Some(b'}') => Ok(()),
            None => Err(Error::eof()),
            Some(b) => Err(Error::unexpected_token(
                format!("{}, expected a close brace", char::from(b)),
                offset,
            )),
        }
    }

    fn parse_value(&mut self) -> Result<Value, Error> {
        match self.source.peek()? {
            Some(b'"') => self.parse_quoted(),
            Some(b'{') => {
                self.source.bump()?;
                let value = self.parse_container()?;
                self.expect_close()?;
                Ok(value)
            }
            _ => {
                self.read_token()?;
                self.narrow_scratch_value()
            }
        }
    }

    /// Quoted values never narrow to bools or numbers, only to dates
    fn parse_quoted(&mut self) -> Result<Value, Error> {
        self.source.bump()?;
        self.scratch_len = 0;
        loop {
            match self.source.bump()? {
                None => return Err(Error::eof()),
                Some(b'"') => break,
                Some(b) => self.push_scratch(b)?,
            }
        }

        if let Some(date) = Date::parse(&self.scratch[..self.scratch_len]) {
            Ok(Value::Date(date))
        } else {
            Ok(Value::String(self.intern_token()))
        }
    }

    /// Disambiguates what a freshly opened `{` holds. On return the closing
    /// brace is the next unconsumed byte.
    fn parse_container(&mut self) -> Result<Value, Error> {
        self.skip_whitespace()?;
        match self.source.peek()? {
            None => Err(Error::eof()),
            Some(b'}') => Ok(Value::Record(Vec::new())),
            Some(b'"') => self.parse_array(None),
            Some(b'{') => {
                // The first element is itself a container: an empty record, a
                // nested record, or a nested array. Whichever it is, the
                // enclosing container is an array.
                self.source.bump()?;
                let first = self.parse_container()?;
                self.expect_close()?;
                self.parse_array(Some(first))
            }
            _ => {
                self.read_token()?;
                self.skip_whitespace()?;
                match self.source.peek()? {
                    Some(b'}') => {
                        let first = self.narrow_scratch_value()?;
                        Ok(Value::Array(vec![first]))
                    }
                    Some(b'=') => {
                        let key = self.intern_token();
                        self.source.bump()?;
                        self.parse_object(key, StopAt::Close)
                    }
                    _ => {
                        let first = self.narrow_scratch_value()?;
                        self.parse_array(Some(first))
                    }
                }
            }
        }
    }

    fn parse_array(&mut self, first: Option<Value>) -> Result<Value, Error> {
        let mut elements = Vec::new();
        if let Some(x) = first {
            elements.push(x);
        }

        loop {
            self.skip_whitespace()?;
            match self.source.peek()? {
                None => return Err(Error::eof()),
                Some(b'}') => return Ok(Value::Array(elements)),
                _ => elements.push(self.parse_value()?),
            }
        }
    }

    /// Accumulates pairs after the first key's `=` has been consumed
    fn parse_object(&mut self, first_key: Rc<str>, stop: StopAt) -> Result<Value, Error> {
        let mut pairs = Vec::new();
        self.skip_whitespace()?;
        let value = self.parse_value()?;
        pairs.push((first_key, value));
        self.parse_object_rest(&mut pairs, stop)?;
        Ok(Value::Record(pairs))
    }

    fn parse_object_rest(
        &mut self,
        pairs: &mut Vec<(Rc<str>, Value)>,
        stop: StopAt,
    ) -> Result<(), Error> {
        loop {
            self.skip_whitespace()?;

            // The game occasionally emits placeholder blocks without an
            // owning key; they carry no data and are dropped.
            while self.source.peek()? == Some(b'{') {
                self.skip_stray_block()?;
                self.skip_whitespace()?;
            }

            match (stop, self.source.peek()?) {
                (StopAt::Close, Some(b'}')) => return Ok(()),
                (StopAt::Close, None) => return Err(Error::eof()),
                (StopAt::Eof, None) => return Ok(()),
                (StopAt::Eof, Some(b'}')) => {
                    return Err(Error::unexpected_token(
                        "close brace outside any block",
                        self.source.position(),
                    ));
                }
                _ => {}
            }

            self.read_token()?;
            let key = self.intern_token();
            self.expect_equals()?;
            self.skip_whitespace()?;
            let value = self.parse_value()?;
            pairs.push((key, value));
        }
    }

    /// Consumes a keyless `{ .. }` block, including the matching close brace
    fn skip_stray_block(&mut self) -> Result<(), Error> {
        self.source.bump()?;
        let mut depth = 1u32;
        loop {
            match self.source.bump()? {
                None => return Err(Error::eof()),
                Some(b'{') => depth += 1,
                Some(b'}') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {}
            }
        }
    }

    fn parse_hsv(&mut self) -> Result<Value, Error> {
        let [h, s, v] = self.parse_color_block()?;
        Ok(Value::Hsv([h, s, v]))
    }

    fn parse_rgb(&mut self) -> Result<Value, Error> {
        let components = self.parse_color_block()?;
        let mut channels = [0u8; 3];
        for (channel, &x) in channels.iter_mut().zip(components.iter()) {
            if !(0.0..=255.0).contains(&x) {
                return Err(Error::unexpected_token(
                    format!("rgb channel out of range: {}", x),
                    self.source.position(),
                ));
            }
            *channel = x as u8;
        }

        let [r, g, b] = channels;
        Ok(Value::Rgb(Rgb { r, g, b }))
    }

    fn parse_color_block(&mut self) -> Result<[f64; 3], Error> {
        self.skip_whitespace()?;
        let offset = self.source.position();
        if self.source.bump()? != Some(b'{') {
            return Err(Error::unexpected_token(
                "colour header without a block",
                offset,
            ));
        }

        let mut components = [0.0f64; 3];
        for slot in &mut components {
            self.skip_whitespace()?;
            let offset = self.source.position();
            self.read_token()?;
            // Colour components are the one place the game writes decimals of
            // any width, so the strict savegame number shape does not apply.
            *slot = parse_component(&self.scratch[..self.scratch_len])
                .ok_or_else(|| Error::unexpected_token("colour component", offset))?;
        }

        self.skip_whitespace()?;
        let offset = self.source.position();
        match self.source.bump()? {
            Some(b'}') => Ok(components),
            _ => Err(Error::unexpected_token(
                "unterminated colour block",
                offset,
            )),
        }
    }
}

/// Lenient decimal parse for colour components
fn parse_component(data: &[u8]) -> Option<f64> {
    let (sign, rest) = match data.split_first() {
        Some((b'-', rest)) => (-1.0, rest),
        _ => (1.0, data),
    };

    if rest.is_empty() {
        return None;
    }

    let mut mantissa: u64 = 0;
    let mut digits = 0u32;
    let mut frac_digits: Option<i32> = None;
    for &c in rest {
        match c {
            b'0'..=b'9' => {
                mantissa = mantissa
                    .checked_mul(10)?
                    .checked_add(u64::from(c - b'0'))?;
                digits += 1;
                if let Some(n) = frac_digits.as_mut() {
                    *n += 1;
                }
            }
            b'.' if frac_digits.is_none() => frac_digits = Some(0),
            _ => return None,
        }
    }

    if digits == 0 {
        return None;
    }

    let scale = 10f64.powi(frac_digits.unwrap_or(0));
    Some(sign * (mantissa as f64) / scale)
}

#[inline]
fn hash_bytes(data: &[u8]) -> u64 {
    // FNV-1a
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for &b in data {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }

    hash
}
