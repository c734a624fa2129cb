//! Detecting and unwrapping the containers save files arrive in
//!
//! A save on disk is one of three things: plain text data behind a text
//! header, binary data behind a binary header, or either of those wrapped in
//! a zip archive. The [load] entry point sniffs which one it has and
//! dispatches to the right parser, building the token dictionary only when
//! the binary route is taken.

use crate::{
    binary::{load_binary, TokenResolver},
    errors::ErrorKind,
    text::parse_text,
    Error, Value,
};
use rawzip::CompressionMethod;
use std::io::Read;
use std::path::Path;

const ZIP_MAGIC: &[u8] = b"PK";

/// Loads a save file from disk, sniffing its container and encoding
///
/// The two headers must be the same length; whichever one the data leads
/// with decides the parser. A zip container is unwrapped first: the archive
/// must hold exactly one entry with a file extension (eg: `save.eu4`), and
/// that entry is inflated and sniffed the same way.
///
/// The resolver closure runs only when the data turns out to be binary, so
/// the cost of building a large token dictionary is not paid for text saves.
pub fn load<P, RES, F>(
    path: P,
    bin_header: &[u8],
    txt_header: &[u8],
    resolver: F,
) -> Result<Value, Error>
where
    P: AsRef<Path>,
    RES: TokenResolver,
    F: FnOnce() -> RES,
{
    let data = std::fs::read(path)?;
    load_slice(&data, bin_header, txt_header, resolver)
}

/// Same sniffing as [load] over data already in memory
pub fn load_slice<RES, F>(
    data: &[u8],
    bin_header: &[u8],
    txt_header: &[u8],
    resolver: F,
) -> Result<Value, Error>
where
    RES: TokenResolver,
    F: FnOnce() -> RES,
{
    if bin_header.len() != txt_header.len() {
        return Err(Error::invalid_header(
            "the text and binary headers must have the same length",
        ));
    }

    if data.starts_with(ZIP_MAGIC) {
        let inner = unwrap_archive(data)?;
        return load_slice(&inner, bin_header, txt_header, resolver);
    }

    match data.get(..bin_header.len()) {
        Some(observed) if observed == bin_header => {
            let resolver = resolver();
            load_binary(&data[bin_header.len()..], &resolver, None)
        }
        // The text parser would tolerate the header on its own, but the
        // remainder parses identically with the header bytes consumed here.
        Some(observed) if observed == txt_header => parse_text(&data[txt_header.len()..]),
        _ => Err(Error::invalid_header(format!(
            "unable to determine the file format, expected {} or {}",
            String::from_utf8_lossy(txt_header),
            String::from_utf8_lossy(bin_header),
        ))),
    }
}

/// Extracts the single data-bearing entry of a save archive
fn unwrap_archive(data: &[u8]) -> Result<Vec<u8>, Error> {
    let locator = rawzip::ZipArchive::with_max_search_space(64 * 1024);
    let archive = match locator.locate_in_slice(data) {
        Ok(archive) => archive,
        Err((_, e)) => {
            return Err(Error::new(ErrorKind::ZipLayout {
                msg: format!("unable to read the archive: {}", e),
            }));
        }
    };

    let mut entries = archive.entries();
    let mut found = None;
    while let Some(entry) = entries.next_entry().map_err(zip_layout)? {
        if !has_extension(entry.file_path().as_ref()) {
            continue;
        }

        if found.is_some() {
            return Err(Error::new(ErrorKind::ZipLayout {
                msg: String::from("expected a single entry with a file extension"),
            }));
        }

        found = Some((entry.compression_method(), entry.wayfinder()));
    }

    let (compression, wayfinder) = found.ok_or_else(|| {
        Error::new(ErrorKind::ZipLayout {
            msg: String::from("no entry with a file extension"),
        })
    })?;

    if compression != CompressionMethod::Deflate {
        return Err(Error::new(ErrorKind::ZipLayout {
            msg: String::from("unsupported compression method"),
        }));
    }

    let zip_entry = archive.get_entry(wayfinder).map_err(zip_layout)?;
    let mut inflated = Vec::new();
    flate2::read::DeflateDecoder::new(zip_entry.data()).read_to_end(&mut inflated)?;
    Ok(inflated)
}

fn has_extension(path: &[u8]) -> bool {
    let path = String::from_utf8_lossy(path);
    Path::new(path.as_ref())
        .extension()
        .map_or(false, |x| !x.is_empty())
}

#[cold]
fn zip_layout<E: std::fmt::Display>(e: E) -> Error {
    Error::new(ErrorKind::ZipLayout { msg: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::has_extension;

    #[test]
    fn test_has_extension() {
        assert!(has_extension(b"save.eu4"));
        assert!(has_extension(b"nested/save.eu4"));
        assert!(!has_extension(b"gamestate"));
        assert!(!has_extension(b"meta"));
        assert!(!has_extension(b".hidden"));
        assert!(!has_extension(b"trailing."));
    }
}
