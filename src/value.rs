use crate::{Date, Error, ErrorKind};
use std::rc::Rc;

/// A red-green-blue colour from a `rgb { r g b }` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel
    pub r: u8,

    /// Green channel
    pub g: u8,

    /// Blue channel
    pub b: u8,
}

/// An owned, lossless representation of a parsed document
///
/// Both the text and binary parsers produce this tree, and the text writer
/// consumes it. Strings and record keys are reference counted so that values
/// interned during the parse share storage with the finished tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean (`yes`/`no` in the text form)
    Bool(bool),

    /// A number; integers and decimals are not distinguished
    Number(f64),

    /// A date in the game calendar
    Date(Date),

    /// Windows-1252 decoded text
    String(Rc<str>),

    /// A `hsv { h s v }` colour (text form only)
    Hsv([f64; 3]),

    /// A `rgb { r g b }` colour (text form only)
    Rgb(Rgb),

    /// An ordered sequence of values, possibly heterogeneous
    Array(Vec<Value>),

    /// An ordered sequence of key-value pairs
    ///
    /// Keys are not unique: the format repeats a key instead of writing an
    /// array for many aggregates (eg: multiple `army=` blocks), and the pairs
    /// are kept verbatim in document order.
    Record(Vec<(Rc<str>, Value)>),
}

impl Value {
    pub(crate) fn variant_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Date(_) => "date",
            Value::String(_) => "string",
            Value::Hsv(_) => "hsv",
            Value::Rgb(_) => "rgb",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
        }
    }

    #[cold]
    fn mismatch(&self, expected: &'static str) -> Error {
        Error::new(ErrorKind::TypeMismatch {
            expected,
            found: self.variant_name(),
        })
    }

    /// Interpret the value as a boolean, failing on any other variant
    pub fn as_bool(&self) -> Result<bool, Error> {
        match self {
            Value::Bool(b) => Ok(*b),
            x => Err(x.mismatch("bool")),
        }
    }

    /// Interpret the value as a number, failing on any other variant
    pub fn as_number(&self) -> Result<f64, Error> {
        match self {
            Value::Number(n) => Ok(*n),
            x => Err(x.mismatch("number")),
        }
    }

    /// Interpret the value as an integer, truncating any fractional part
    pub fn as_integer(&self) -> Result<i64, Error> {
        self.as_number().map(|x| x as i64)
    }

    /// Interpret the value as a date, failing on any other variant
    pub fn as_date(&self) -> Result<Date, Error> {
        match self {
            Value::Date(d) => Ok(*d),
            x => Err(x.mismatch("date")),
        }
    }

    /// Interpret the value as a string, failing on any other variant
    pub fn as_str(&self) -> Result<&str, Error> {
        match self {
            Value::String(s) => Ok(s),
            x => Err(x.mismatch("string")),
        }
    }

    /// Interpret the value as an array, failing on any other variant
    ///
    /// An empty record also qualifies: `{}` is indistinguishable from an
    /// empty array in the text form.
    pub fn as_array(&self) -> Result<&[Value], Error> {
        match self {
            Value::Array(elements) => Ok(elements),
            Value::Record(pairs) if pairs.is_empty() => Ok(&[]),
            x => Err(x.mismatch("array")),
        }
    }

    /// Interpret the value as a record, failing on any other variant
    ///
    /// An empty array also qualifies, mirroring [`as_array`](Self::as_array).
    pub fn as_record(&self) -> Result<&[(Rc<str>, Value)], Error> {
        match self {
            Value::Record(pairs) => Ok(pairs),
            Value::Array(elements) if elements.is_empty() => Ok(&[]),
            x => Err(x.mismatch("record")),
        }
    }

    /// Returns the first property with the given name, failing when the value
    /// is not a record or no pair matches
    ///
    /// ```
    /// use moltke::parse_string;
    /// let tree = parse_string("name=aaa name=bbb").unwrap();
    /// assert_eq!(tree.get("name").unwrap().as_str().unwrap(), "aaa");
    /// assert!(tree.get("core").is_err());
    /// ```
    pub fn get(&self, key: &str) -> Result<&Value, Error> {
        self.try_get(key).ok_or_else(|| {
            Error::new(ErrorKind::MissingField {
                name: key.to_string(),
            })
        })
    }

    /// Returns the first property with the given name, or `None`
    pub fn try_get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Record(pairs) => pairs
                .iter()
                .find(|(k, _)| k.as_ref() == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Iterates over every value stored under the given key, in document order
    pub fn fields<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        let pairs = match self {
            Value::Record(pairs) => pairs.as_slice(),
            _ => &[],
        };

        pairs
            .iter()
            .filter(move |(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }

    /// Gathers every value stored under the given key into an array
    ///
    /// ```
    /// use moltke::parse_string;
    /// let tree = parse_string("core=AAA core=BBB other=1").unwrap();
    /// let cores = tree.collect("core");
    /// assert_eq!(cores.as_array().unwrap().len(), 2);
    /// ```
    pub fn collect(&self, key: &str) -> Value {
        Value::Array(self.fields(key).cloned().collect())
    }

    /// Gets a value from an array by index
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(elements) => elements.get(index),
            _ => None,
        }
    }

    /// Iterates over the key-value pairs of a record; empty for any other
    /// variant
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        let pairs = match self {
            Value::Record(pairs) => pairs.as_slice(),
            _ => &[],
        };

        pairs.iter().map(|(k, v)| (k.as_ref(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: Vec<(&str, Value)>) -> Value {
        Value::Record(
            pairs
                .into_iter()
                .map(|(k, v)| (Rc::from(k), v))
                .collect(),
        )
    }

    #[test]
    fn test_typed_casts() {
        assert_eq!(Value::Bool(true).as_bool().unwrap(), true);
        assert_eq!(Value::Number(1.5).as_number().unwrap(), 1.5);
        assert_eq!(Value::Number(1.5).as_integer().unwrap(), 1);
        assert_eq!(Value::String(Rc::from("x")).as_str().unwrap(), "x");
        assert!(Value::Bool(true).as_number().is_err());
        assert!(Value::Number(1.0).as_str().is_err());
    }

    #[test]
    fn test_duplicate_keys_preserved() {
        let tree = record(vec![
            ("army", Value::Number(1.0)),
            ("navy", Value::Number(3.0)),
            ("army", Value::Number(2.0)),
        ]);

        assert_eq!(tree.get("army").unwrap(), &Value::Number(1.0));
        let armies: Vec<_> = tree.fields("army").collect();
        assert_eq!(armies, vec![&Value::Number(1.0), &Value::Number(2.0)]);
        assert_eq!(
            tree.collect("army"),
            Value::Array(vec![Value::Number(1.0), Value::Number(2.0)])
        );
    }

    #[test]
    fn test_missing_field() {
        let tree = record(vec![("a", Value::Bool(false))]);
        assert!(tree.try_get("b").is_none());
        let err = tree.get("b").unwrap_err();
        assert!(err.to_string().contains("b"));
    }

    #[test]
    fn test_array_indexing() {
        let arr = Value::Array(vec![Value::Number(10.0), Value::Bool(true)]);
        assert_eq!(arr.get_index(0), Some(&Value::Number(10.0)));
        assert_eq!(arr.get_index(2), None);
        assert!(arr.as_array().is_ok());
        assert!(arr.as_record().is_err());
    }
}
