use crate::{errors::ErrorKind, Error, Value, Windows1252Encoding};
use std::io::Write;

/// Writes a value tree back to the plaintext form
///
/// The emitted form is not pretty printed: every scalar ends with a newline
/// and that newline is the only separator the parser needs. Records and
/// arrays surround their contents with braces and nothing else.
#[derive(Debug)]
pub struct TextWriter<W> {
    writer: W,
}

impl<W: Write> TextWriter<W> {
    /// Creates a writer over any `io::Write` sink
    pub fn new(writer: W) -> Self {
        TextWriter { writer }
    }

    /// Writes the top-level record
    ///
    /// Only records serialize at the top level; every other variant is
    /// rejected since the parsers never produce one there.
    pub fn write_root(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::Record(pairs) => {
                for (key, value) in pairs {
                    self.write_text(key)?;
                    self.writer.write_all(b"=")?;
                    self.write_value(value)?;
                }

                Ok(())
            }
            other => Err(Error::new(ErrorKind::Serialize {
                msg: format!(
                    "only records form a document root, found {}",
                    other.variant_name()
                ),
            })),
        }
    }

    fn write_value(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::Bool(true) => self.writer.write_all(b"yes\n")?,
            Value::Bool(false) => self.writer.write_all(b"no\n")?,
            Value::Number(x) => writeln!(self.writer, "{:.3}", x)?,
            Value::Date(d) => writeln!(self.writer, "{}", d.game_fmt())?,
            Value::String(s) => {
                self.writer.write_all(b"\"")?;
                self.write_text(s)?;
                self.writer.write_all(b"\"\n")?;
            }
            Value::Hsv([h, s, v]) => {
                writeln!(self.writer, "hsv {{ {:.3} {:.3} {:.3} }}", h, s, v)?;
            }
            Value::Rgb(c) => {
                writeln!(self.writer, "rgb {{ {} {} {} }}", c.r, c.g, c.b)?;
            }
            Value::Array(elements) => {
                self.writer.write_all(b"{")?;
                for element in elements {
                    self.write_value(element)?;
                }
                self.writer.write_all(b"}")?;
            }
            Value::Record(pairs) => {
                self.writer.write_all(b"{")?;
                for (key, value) in pairs {
                    self.write_text(key)?;
                    self.writer.write_all(b"=")?;
                    self.write_value(value)?;
                }
                self.writer.write_all(b"}")?;
            }
        }

        Ok(())
    }

    /// The format has no escaping, so text goes out as its windows-1252 bytes
    fn write_text(&mut self, s: &str) -> Result<(), Error> {
        self.writer.write_all(&Windows1252Encoding::encode(s))?;
        Ok(())
    }
}

/// Serializes a value tree to a writer in the plaintext form
pub fn save<W: Write>(writer: W, value: &Value) -> Result<(), Error> {
    TextWriter::new(writer).write_root(value)
}

/// Serializes a value tree to plaintext bytes
pub fn to_vec(value: &Value) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    save(&mut out, value)?;
    Ok(out)
}

/// Serializes a value tree to a string
pub fn to_string(value: &Value) -> Result<String, Error> {
    let out = to_vec(value)?;
    Ok(Windows1252Encoding::decode(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Rgb;
    use std::rc::Rc;

    fn record(pairs: Vec<(&str, Value)>) -> Value {
        Value::Record(pairs.into_iter().map(|(k, v)| (Rc::from(k), v)).collect())
    }

    #[test]
    fn test_scalars() {
        let tree = record(vec![
            ("a", Value::Bool(true)),
            ("b", Value::Bool(false)),
            ("c", Value::Number(1.5)),
            ("d", Value::String(Rc::from("x y"))),
        ]);

        let out = to_string(&tree).unwrap();
        assert_eq!(out, "a=yes\nb=no\nc=1.500\nd=\"x y\"\n");
    }

    #[test]
    fn test_date_fmt() {
        let date = crate::Date::new(1444, 11, 11, 0).unwrap();
        let tree = record(vec![("start", Value::Date(date))]);
        assert_eq!(to_string(&tree).unwrap(), "start=1444.11.11\n");
    }

    #[test]
    fn test_colors() {
        let tree = record(vec![
            ("h", Value::Hsv([0.5, 0.2, 0.8])),
            ("r", Value::Rgb(Rgb { r: 110, g: 27, b: 27 })),
        ]);

        let out = to_string(&tree).unwrap();
        assert_eq!(
            out,
            "h=hsv { 0.500 0.200 0.800 }\nr=rgb { 110 27 27 }\n"
        );
    }

    #[test]
    fn test_nested() {
        let tree = record(vec![(
            "a",
            Value::Array(vec![
                Value::Number(1.0),
                Value::Record(vec![(Rc::from("b"), Value::Bool(true))]),
            ]),
        )]);

        assert_eq!(to_string(&tree).unwrap(), "a={1.000\n{b=yes\n}}");
    }

    #[test]
    fn test_non_record_root() {
        let err = to_vec(&Value::Number(1.0)).unwrap_err();
        assert!(err.to_string().contains("root"));
    }

    #[test]
    fn test_windows_1252_output() {
        let tree = record(vec![("name", Value::String(Rc::from("Jürgen")))]);
        let out = to_vec(&tree).unwrap();
        assert_eq!(out, b"name=\"J\xfcrgen\"\n");
    }
}
