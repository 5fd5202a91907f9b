//! Input encoding detection
//!
//! Font files are almost always UTF-8, but UTF-16 and Latin-1 exports exist.
//! The encoding is sniffed from the byte order mark or from the byte pattern
//! of a leading '<'. For 8-bit input without a BOM the `encoding` named in
//! the XML declaration decides. The document is handed to the tokenizer as
//! UTF-8 text.

use super::scanner::is_whitespace;
use memchr::{memchr, memmem};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    /// ISO-8859-1: every byte is the code point of the same value
    Latin1,
    Ascii,
}

impl XmlEncoding {
    /// Detect encoding from byte order mark, initial bytes or declaration
    pub fn detect(input: &[u8]) -> Result<Self, &'static str> {
        match input {
            [0xFF, 0xFE, ..] | [b'<', 0x00, ..] => Ok(XmlEncoding::Utf16Le),
            [0xFE, 0xFF, ..] | [0x00, b'<', ..] => Ok(XmlEncoding::Utf16Be),
            [0xEF, 0xBB, 0xBF, ..] => Ok(XmlEncoding::Utf8),
            _ => match declared_encoding(input) {
                Some(label) => Self::from_label(label).ok_or("Unsupported encoding in XML declaration"),
                None => Ok(XmlEncoding::Utf8),
            },
        }
    }

    /// Encoding for an `encoding="..."` label, matched case-insensitively
    pub fn from_label(label: &[u8]) -> Option<Self> {
        match label.to_ascii_lowercase().as_slice() {
            b"utf-8" | b"utf8" => Some(XmlEncoding::Utf8),
            b"iso-8859-1" | b"iso8859-1" | b"iso_8859-1" | b"latin1" | b"latin-1" | b"l1" => {
                Some(XmlEncoding::Latin1)
            }
            b"us-ascii" | b"ascii" => Some(XmlEncoding::Ascii),
            _ => None,
        }
    }
}

/// The `encoding` pseudo-attribute of a leading XML declaration
fn declared_encoding(input: &[u8]) -> Option<&[u8]> {
    let body = input.strip_prefix(b"<?xml")?;
    if !body.first().is_some_and(|&b| is_whitespace(b)) {
        return None;
    }
    let decl = &body[..memmem::find(body, b"?>")?];
    let after = &decl[memmem::find(decl, b"encoding")? + b"encoding".len()..];
    let value = after.trim_ascii_start().strip_prefix(b"=")?.trim_ascii_start();
    let (&quote, value) = value.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    Some(&value[..memchr(quote, value)?])
}

/// Decode raw document bytes into UTF-8 text, dropping any byte order mark
pub fn decode_input(input: &[u8]) -> Result<Cow<'_, str>, &'static str> {
    match XmlEncoding::detect(input)? {
        XmlEncoding::Utf8 => {
            let body = input.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(input);
            std::str::from_utf8(body)
                .map(Cow::Borrowed)
                .map_err(|_| "Invalid UTF-8 in input")
        }
        XmlEncoding::Utf16Le => {
            let body = input.strip_prefix(&[0xFF, 0xFE]).unwrap_or(input);
            decode_utf16(body, u16::from_le_bytes).map(Cow::Owned)
        }
        XmlEncoding::Utf16Be => {
            let body = input.strip_prefix(&[0xFE, 0xFF]).unwrap_or(input);
            decode_utf16(body, u16::from_be_bytes).map(Cow::Owned)
        }
        XmlEncoding::Latin1 => Ok(Cow::Owned(input.iter().map(|&b| char::from(b)).collect())),
        XmlEncoding::Ascii => {
            if !input.is_ascii() {
                return Err("Non-ASCII byte in US-ASCII input");
            }
            std::str::from_utf8(input)
                .map(Cow::Borrowed)
                .map_err(|_| "Invalid US-ASCII in input")
        }
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, &'static str> {
    if bytes.len() % 2 != 0 {
        return Err("Invalid UTF-16: odd number of bytes");
    }
    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&code_units).map_err(|_| "Invalid UTF-16: unpaired surrogate")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_utf8() {
        assert_eq!(XmlEncoding::detect(b"<svg/>"), Ok(XmlEncoding::Utf8));
        assert_eq!(XmlEncoding::detect(&[0xEF, 0xBB, 0xBF, b'<']), Ok(XmlEncoding::Utf8));
        assert_eq!(
            XmlEncoding::detect(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><svg/>"),
            Ok(XmlEncoding::Utf8)
        );
    }

    #[test]
    fn test_detect_utf16() {
        assert_eq!(XmlEncoding::detect(&[0xFF, 0xFE, b'<', 0x00]), Ok(XmlEncoding::Utf16Le));
        assert_eq!(XmlEncoding::detect(&[0x00, b'<', 0x00, b'g']), Ok(XmlEncoding::Utf16Be));
    }

    #[test]
    fn test_detect_declared_encoding() {
        assert_eq!(
            XmlEncoding::detect(b"<?xml version='1.0' encoding = 'iso-8859-1'?><svg/>"),
            Ok(XmlEncoding::Latin1)
        );
        assert_eq!(
            XmlEncoding::detect(b"<?xml version=\"1.0\" encoding=\"US-ASCII\" standalone=\"no\"?>"),
            Ok(XmlEncoding::Ascii)
        );
        assert!(XmlEncoding::detect(b"<?xml version=\"1.0\" encoding=\"Shift_JIS\"?><svg/>").is_err());
    }

    #[test]
    fn test_encoding_outside_declaration_ignored() {
        assert_eq!(
            XmlEncoding::detect(b"<?xml-stylesheet encoding=\"latin1\"?><svg/>"),
            Ok(XmlEncoding::Utf8)
        );
        assert_eq!(
            XmlEncoding::detect(b"<?xml version=\"1.0\"?><svg encoding=\"latin1\"/>"),
            Ok(XmlEncoding::Utf8)
        );
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let decoded = decode_input(&[0xEF, 0xBB, 0xBF, b'<', b'g', b'/', b'>']).unwrap();
        assert_eq!(decoded, "<g/>");
        assert!(matches!(decoded, Cow::Borrowed(_)));
    }

    #[test]
    fn test_utf16_le_with_bom() {
        let input = [0xFF, 0xFE, b'<', 0x00, b'g', 0x00, b'/', 0x00, b'>', 0x00];
        assert_eq!(decode_input(&input).unwrap(), "<g/>");
    }

    #[test]
    fn test_utf16_be_without_bom() {
        let input = [0x00, b'<', 0x00, b'g', 0x00, b'/', 0x00, b'>'];
        assert_eq!(decode_input(&input).unwrap(), "<g/>");
    }

    #[test]
    fn test_latin1_input() {
        let mut input = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><glyph glyph-name=\"".to_vec();
        input.push(0xE9);
        input.extend_from_slice(b"\"/>");
        let decoded = decode_input(&input).unwrap();
        assert!(decoded.ends_with("glyph-name=\"\u{e9}\"/>"));
    }

    #[test]
    fn test_ascii_input() {
        assert!(decode_input(b"<?xml version=\"1.0\" encoding=\"us-ascii\"?><a/>").is_ok());
        assert!(decode_input(b"<?xml version=\"1.0\" encoding=\"us-ascii\"?><a b=\"\xE9\"/>").is_err());
    }

    #[test]
    fn test_invalid_input() {
        assert!(decode_input(&[b'<', 0xC3, 0x28]).is_err());
        assert!(decode_input(&[0xFF, 0xFE, b'<']).is_err());
    }
}
