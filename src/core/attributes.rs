//! XML Attribute Parsing
//!
//! Parses the attribute list of a start or empty tag. Only well-formed
//! attributes are accepted: `name = "value"` or `name = 'value'`.

use super::dtd::EntityTable;
use super::entities::decode_attribute;
use super::scanner::{is_name_char, is_name_start_char, is_whitespace};
use memchr::memchr;
use std::borrow::Cow;

/// A parsed XML attribute
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    /// Qualified name as written (may include a prefix)
    pub name: &'a [u8],
    /// Decoded, whitespace-normalized value
    pub value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    pub fn new(name: &'a [u8], value: Cow<'a, [u8]>) -> Self {
        Attribute { name, value }
    }

}

/// Split a qualified name into prefix and local part at the first colon
pub fn split_name(name: &[u8]) -> (Option<&[u8]>, &[u8]) {
    match memchr(b':', name) {
        Some(colon) => (Some(&name[..colon]), &name[colon + 1..]),
        None => (None, name),
    }
}

/// Parse attributes from the raw tag content following the element name.
///
/// `input` is everything between the element name and the closing `>` or `/>`.
/// Entity references in values are resolved against `entities`.
pub fn parse_attributes<'a>(input: &'a [u8], entities: &EntityTable) -> Result<Vec<Attribute<'a>>, &'static str> {
    let mut attrs = Vec::new();
    let mut pos = 0;

    loop {
        let ws_start = pos;
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }
        if pos >= input.len() {
            break;
        }
        if pos == ws_start && !attrs.is_empty() {
            return Err("Attributes must be separated by whitespace");
        }

        if !is_name_start_char(input[pos]) {
            return Err("Attribute name must start with letter, underscore, or colon");
        }
        let name_start = pos;
        while pos < input.len() && is_name_char(input[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }
        if input.get(pos) != Some(&b'=') {
            return Err("Attribute value required");
        }
        pos += 1;
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        let quote = match input.get(pos) {
            Some(&q) if q == b'"' || q == b'\'' => q,
            _ => return Err("Attribute value must be quoted"),
        };
        pos += 1;
        let value_len = memchr(quote, &input[pos..]).ok_or("Attribute value has mismatched quotes")?;
        let raw = &input[pos..pos + value_len];
        if memchr(b'<', raw).is_some() {
            return Err("Attribute value cannot contain '<'");
        }
        attrs.push(Attribute::new(name, decode_attribute(raw, entities)?));
        pos += value_len + 1;
    }

    Ok(attrs)
}
