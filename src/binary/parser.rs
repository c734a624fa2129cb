use crate::{
    binary::{
        lexer::{self, LexemeId, Token},
        TokenResolver,
    },
    Date, Error, Value,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::rc::Rc;

/// State machine over the binary lexeme stream
///
/// The binary form mirrors the text form's shape, including its ambiguity: a
/// group is an array or an object depending only on what follows its first
/// lexeme, and stray empty groups are interleaved between pairs.
struct BinaryParser<'data, 'res, RES> {
    data: &'data [u8],
    original_length: usize,
    resolver: &'res RES,

    // Token ids repeat constantly, so resolved names are cached per parse
    names: HashMap<u16, Rc<str>>,
}

impl<'data, 'res, RES: TokenResolver> BinaryParser<'data, 'res, RES> {
    fn new(data: &'data [u8], resolver: &'res RES) -> Self {
        BinaryParser {
            data,
            original_length: data.len(),
            resolver,
            names: HashMap::new(),
        }
    }

    /// Byte offset of the next unconsumed byte
    #[inline]
    fn position(&self) -> usize {
        self.original_length - self.data.len()
    }

    #[inline]
    fn next_token(&mut self) -> Result<Token<'data>, Error> {
        let (token, rest) = lexer::read_token(self.data).map_err(|_| Error::eof())?;
        self.data = rest;
        Ok(token)
    }

    #[inline]
    fn peek_id(&self) -> Option<LexemeId> {
        lexer::read_id(self.data).ok().map(|(id, _)| id)
    }

    fn parse(mut self, header: Option<&[u8]>) -> Result<Value, Error> {
        if let Some(expected) = header {
            match self.data.strip_prefix(expected) {
                Some(rest) => self.data = rest,
                None => {
                    return Err(Error::invalid_header(format!(
                        "expected the data to start with: {}",
                        String::from_utf8_lossy(expected),
                    )));
                }
            }
        }

        let mut pairs = Vec::new();
        while !self.data.is_empty() {
            let offset = self.position();
            let token = self.next_token()?;
            let key = self.identifier(token, offset)?;
            self.expect_equal()?;
            let token = self.next_token()?;
            let value = self.parse_value(token)?;
            self.skip_empty_groups()?;
            pairs.push((key, value));
        }

        Ok(Value::Record(pairs))
    }

    /// Keys may arrive as strings, token ids, or even plain integers; the
    /// integer forms stringify to decimal.
    fn identifier(&mut self, token: Token<'data>, offset: usize) -> Result<Rc<str>, Error> {
        match token {
            Token::Quoted(s) | Token::Unquoted(s) => Ok(rc_str(s.to_utf8())),
            Token::Id(id) => Ok(self.resolve_name(id)),
            Token::I32(x) => Ok(Rc::from(x.to_string())),
            Token::U32(x) => Ok(Rc::from(x.to_string())),
            _ => Err(Error::new(crate::ErrorKind::MissingIdentifier { offset })),
        }
    }

    fn resolve_name(&mut self, id: u16) -> Rc<str> {
        if let Some(name) = self.names.get(&id) {
            return Rc::clone(name);
        }

        let name: Rc<str> = match self.resolver.resolve(id) {
            Some(x) => Rc::from(x),
            None => Rc::from(id.to_string()),
        };
        self.names.insert(id, Rc::clone(&name));
        name
    }

    fn expect_equal(&mut self) -> Result<(), Error> {
        let offset = self.position();
        match self.next_token()? {
            Token::Equal => Ok(()),
            _ => Err(Error::new(crate::ErrorKind::MissingEquals { offset })),
        }
    }

    fn parse_value(&mut self, token: Token<'data>) -> Result<Value, Error> {
        match token {
            // A signed integer may be a date in disguise
            Token::I32(x) => Ok(Date::from_binary(x)
                .map(Value::Date)
                .unwrap_or(Value::Number(f64::from(x)))),
            Token::U32(x) => Ok(Value::Number(f64::from(x))),
            Token::Bool(x) => Ok(Value::Bool(x)),
            Token::Quoted(s) | Token::Unquoted(s) => Ok(Value::String(rc_str(s.to_utf8()))),
            Token::F32(x) | Token::F64(x) => Ok(Value::Number(x)),

            // A bare token in value position is a pseudo-enum
            Token::Id(id) => Ok(Value::String(self.resolve_name(id))),
            Token::Open => self.parse_subgroup(),
            other => Err(Error::unexpected_token(other.kind(), self.position())),
        }
    }

    /// Disambiguates a freshly opened group by its first one or two lexemes
    fn parse_subgroup(&mut self) -> Result<Value, Error> {
        let offset = self.position();
        let first = self.next_token()?;
        match first {
            Token::Close => Ok(Value::Record(Vec::new())),

            // A leading scalar leaves all three readings open: the key of an
            // object, a lone array element, or the first of many.
            Token::I32(_) | Token::U32(_) | Token::Quoted(_) | Token::Unquoted(_) => {
                let second = self.next_token()?;
                match second {
                    Token::Equal => {
                        let key = self.identifier(first, offset)?;
                        self.parse_object(key)
                    }
                    Token::Close => {
                        let value = self.parse_value(first)?;
                        Ok(Value::Array(vec![value]))
                    }
                    _ => {
                        let mut elements = vec![self.parse_value(first)?];
                        elements.push(self.parse_value(second)?);
                        self.parse_array(elements)
                    }
                }
            }

            // Floats never key an object
            Token::F32(x) | Token::F64(x) => self.parse_array(vec![Value::Number(x)]),

            // A nested group means the enclosing group is an array
            Token::Open => {
                let first = self.parse_subgroup()?;
                self.parse_array(vec![first])
            }

            Token::Id(id) => {
                let key = self.resolve_name(id);
                self.expect_equal()?;
                self.parse_object(key)
            }

            other => Err(Error::unexpected_token(other.kind(), offset)),
        }
    }

    /// Accumulates pairs; entered with the first key read and its `=` consumed
    fn parse_object(&mut self, first_key: Rc<str>) -> Result<Value, Error> {
        let token = self.next_token()?;
        let value = self.parse_value(token)?;
        let mut pairs = vec![(first_key, value)];

        loop {
            let mut offset = self.position();
            let mut token = self.next_token()?;

            // Stray empty groups may sit where a key belongs
            while token == Token::Open {
                let inner = self.next_token()?;
                if inner != Token::Close {
                    return Err(Error::unexpected_token(inner.kind(), offset));
                }
                offset = self.position();
                token = self.next_token()?;
            }

            if token == Token::Close {
                return Ok(Value::Record(pairs));
            }

            let key = self.identifier(token, offset)?;
            self.expect_equal()?;
            let token = self.next_token()?;
            let value = self.parse_value(token)?;
            pairs.push((key, value));
        }
    }

    fn parse_array(&mut self, mut elements: Vec<Value>) -> Result<Value, Error> {
        loop {
            let token = self.next_token()?;
            if token == Token::Close {
                return Ok(Value::Array(elements));
            }
            elements.push(self.parse_value(token)?);
        }
    }

    /// Same stray `{}` tolerance as between text pairs, but at the top level
    /// the groups sit after a pair's value rather than before its key
    fn skip_empty_groups(&mut self) -> Result<(), Error> {
        while self.peek_id() == Some(LexemeId::OPEN) {
            self.next_token()?;
            let offset = self.position();
            let token = self.next_token()?;
            if token != Token::Close {
                return Err(Error::unexpected_token(token.kind(), offset));
            }
        }

        Ok(())
    }
}

fn rc_str(s: Cow<'_, str>) -> Rc<str> {
    match s {
        Cow::Borrowed(x) => Rc::from(x),
        Cow::Owned(x) => Rc::from(x),
    }
}

/// Parses binary data into a value tree
///
/// When `header` is given, the data must start with exactly those bytes.
/// Token ids resolve through the given resolver, with unknown ids falling
/// back to their decimal form.
///
/// ```
/// use moltke::load_binary;
/// use std::collections::HashMap;
///
/// let data = [0x82, 0x2d, 0x01, 0x00, 0x0f, 0x00, 0x03, 0x00, 0x45, 0x4e, 0x47];
/// let mut map = HashMap::new();
/// map.insert(0x2d82, "tag");
///
/// let tree = load_binary(&data, &map, None)?;
/// assert_eq!(tree.get("tag")?.as_str()?, "ENG");
/// # Ok::<(), moltke::Error>(())
/// ```
pub fn load_binary<RES>(data: &[u8], resolver: &RES, header: Option<&[u8]>) -> Result<Value, Error>
where
    RES: TokenResolver,
{
    BinaryParser::new(data, resolver).parse(header)
}

/// Parses binary data into a value tree, streaming the input to memory first
///
/// The binary grammar needs the total input length to know where the top
/// object ends, so readers are drained before parsing starts.
pub fn parse_binary<R, RES>(
    mut reader: R,
    resolver: &RES,
    header: Option<&[u8]>,
) -> Result<Value, Error>
where
    R: Read,
    RES: TokenResolver,
{
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    load_binary(&data, resolver, header)
}
