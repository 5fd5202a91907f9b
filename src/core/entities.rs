//! XML Entity Decoding
//!
//! Handles the predefined entities (`&lt; &gt; &amp; &quot; &apos;`),
//! numeric character references (`&#123; &#x7B;`) and general entities
//! declared in the DOCTYPE internal subset. A reference to anything else is
//! an error.
//!
//! Uses Cow so input without references or normalization is not copied.

use super::dtd::EntityTable;
use memchr::{memchr, memchr3};
use std::borrow::Cow;

/// Nesting limit for entities whose replacement text references other entities
const MAX_ENTITY_DEPTH: usize = 16;
/// Upper bound on the expanded size of a single text run or attribute value
const MAX_EXPANDED_LEN: usize = 1 << 24;

/// Decode entity references in text content
#[inline]
pub fn decode_text<'a>(input: &'a [u8], entities: &EntityTable) -> Result<Cow<'a, [u8]>, &'static str> {
    if memchr(b'&', input).is_none() {
        return Ok(Cow::Borrowed(input));
    }
    let mut out = Vec::with_capacity(input.len());
    decode_into(input, entities, false, 0, &mut out)?;
    Ok(Cow::Owned(out))
}

/// Decode an attribute value.
///
/// Besides entity decoding this applies attribute-value normalization:
/// each literal tab, LF or CR becomes a space, with CR LF counted as a
/// single line break. This holds inside entity replacement text too.
/// Whitespace produced by a character reference is kept.
#[inline]
pub fn decode_attribute<'a>(input: &'a [u8], entities: &EntityTable) -> Result<Cow<'a, [u8]>, &'static str> {
    if memchr3(b'&', b'\t', b'\n', input).is_none() && memchr(b'\r', input).is_none() {
        return Ok(Cow::Borrowed(input));
    }
    let mut out = Vec::with_capacity(input.len());
    decode_into(input, entities, true, 0, &mut out)?;
    Ok(Cow::Owned(out))
}

/// Expand character references only, leaving entity references in place.
///
/// This is what happens to an entity value when it is declared.
pub fn expand_char_refs(input: &[u8]) -> Result<Vec<u8>, &'static str> {
    let mut result = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        if input[pos] == b'&' && input.get(pos + 1) == Some(&b'#') {
            let semi = memchr(b';', &input[pos..]).ok_or("Character reference missing ';'")?;
            let ch = decode_char_ref(&input[pos + 2..pos + semi]).ok_or("Invalid character reference")?;
            let mut buf = [0u8; 4];
            result.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            pos += semi + 1;
        } else {
            result.push(input[pos]);
            pos += 1;
        }
    }

    Ok(result)
}

fn decode_into(
    input: &[u8],
    entities: &EntityTable,
    normalize_whitespace: bool,
    depth: usize,
    out: &mut Vec<u8>,
) -> Result<(), &'static str> {
    let mut pos = 0;

    while pos < input.len() {
        match input[pos] {
            b'&' => {
                let semi = memchr(b';', &input[pos..]).ok_or("Entity reference missing ';'")?;
                let entity = &input[pos + 1..pos + semi];
                match decode_entity(entity)? {
                    Some(ch) => {
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    }
                    None => {
                        let replacement = entities.get(entity).ok_or("Undefined entity reference")?;
                        if depth >= MAX_ENTITY_DEPTH {
                            return Err("Entity references nested too deeply");
                        }
                        if memchr(b'<', replacement).is_some() {
                            return Err("Entity replacement text cannot contain '<'");
                        }
                        decode_into(replacement, entities, normalize_whitespace, depth + 1, out)?;
                    }
                }
                if out.len() > MAX_EXPANDED_LEN {
                    return Err("Entity expansion too large");
                }
                pos += semi + 1;
            }
            b'\r' if normalize_whitespace => {
                out.push(b' ');
                pos += if input.get(pos + 1) == Some(&b'\n') { 2 } else { 1 };
            }
            b'\t' | b'\n' if normalize_whitespace => {
                out.push(b' ');
                pos += 1;
            }
            b => {
                out.push(b);
                pos += 1;
            }
        }
    }

    Ok(())
}

/// Decode a predefined entity or character reference body (without '&' and ';').
///
/// `Ok(None)` means the name has to come from the entity table.
fn decode_entity(entity: &[u8]) -> Result<Option<char>, &'static str> {
    match entity {
        b"lt" => Ok(Some('<')),
        b"gt" => Ok(Some('>')),
        b"amp" => Ok(Some('&')),
        b"quot" => Ok(Some('"')),
        b"apos" => Ok(Some('\'')),
        [b'#', digits @ ..] => decode_char_ref(digits).map(Some).ok_or("Invalid character reference"),
        [] => Err("Empty entity reference"),
        _ => Ok(None),
    }
}

fn decode_char_ref(digits: &[u8]) -> Option<char> {
    let codepoint = match digits {
        [b'x', hex @ ..] if !hex.is_empty() => {
            u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?
        }
        dec if !dec.is_empty() && dec.iter().all(u8::is_ascii_digit) => {
            std::str::from_utf8(dec).ok()?.parse::<u32>().ok()?
        }
        _ => return None,
    };

    if !is_valid_xml_char(codepoint) {
        return None;
    }
    char::from_u32(codepoint)
}

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none() -> EntityTable {
        EntityTable::new()
    }

    fn declared(pairs: &[(&str, &str)]) -> EntityTable {
        let mut table = EntityTable::new();
        for (name, value) in pairs {
            table.declare(name.as_bytes(), value.as_bytes()).unwrap();
        }
        table
    }

    #[test]
    fn test_no_entities_borrows() {
        let result = decode_text(b"M0 0L10 10Z", &none()).unwrap();
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_predefined_entities() {
        let result = decode_text(b"&lt;g&gt; &amp; &quot;x&quot; &apos;", &none()).unwrap();
        assert_eq!(result.as_ref(), b"<g> & \"x\" '");
    }

    #[test]
    fn test_char_refs() {
        assert_eq!(decode_text(b"&#65;&#x42;", &none()).unwrap().as_ref(), b"AB");
        assert_eq!(
            std::str::from_utf8(&decode_text(b"&#x1F004;", &none()).unwrap()).unwrap(),
            "\u{1F004}"
        );
    }

    #[test]
    fn test_undefined_entity_is_error() {
        assert!(decode_text(b"&nbsp;", &none()).is_err());
        assert!(decode_text(b"a & b", &none()).is_err());
        assert!(decode_text(b"&nbsp;", &declared(&[("ns_svg", "x")])).is_err());
    }

    #[test]
    fn test_invalid_char_ref_is_error() {
        assert!(decode_text(b"&#0;", &none()).is_err());
        assert!(decode_text(b"&#xD800;", &none()).is_err());
        assert!(decode_text(b"&#x;", &none()).is_err());
    }

    #[test]
    fn test_declared_entity_expands() {
        let table = declared(&[("ns_svg", "http://www.w3.org/2000/svg")]);
        let result = decode_attribute(b"&ns_svg;", &table).unwrap();
        assert_eq!(result.as_ref(), b"http://www.w3.org/2000/svg");
        assert_eq!(decode_text(b"[&ns_svg;]", &table).unwrap().as_ref(), b"[http://www.w3.org/2000/svg]");
    }

    #[test]
    fn test_nested_entities_expand() {
        let table = declared(&[("inner", "M0 0"), ("outer", "&inner; L1 1")]);
        assert_eq!(decode_attribute(b"&outer; Z", &table).unwrap().as_ref(), b"M0 0 L1 1 Z");
    }

    #[test]
    fn test_recursive_entity_is_error() {
        let table = declared(&[("a", "&b;"), ("b", "&a;")]);
        assert!(decode_text(b"&a;", &table).is_err());
    }

    #[test]
    fn test_markup_in_replacement_is_error() {
        let table = declared(&[("tag", "&#60;g/>")]);
        assert!(decode_attribute(b"&tag;", &table).is_err());
    }

    #[test]
    fn test_expansion_limit() {
        let mut table = declared(&[("l0", "0123456789abcdef")]);
        for level in 1..8 {
            let value = format!("&l{0};&l{0};&l{0};&l{0};&l{0};&l{0};&l{0};&l{0};", level - 1);
            table.declare(format!("l{level}").as_bytes(), value.as_bytes()).unwrap();
        }
        assert_eq!(decode_text(b"&l7;", &table), Err("Entity expansion too large"));
    }

    #[test]
    fn test_attribute_whitespace_normalization() {
        let result = decode_attribute(b"M0 0\r\nL1\t1\nZ", &none()).unwrap();
        assert_eq!(result.as_ref(), b"M0 0 L1 1 Z");
    }

    #[test]
    fn test_attribute_char_ref_whitespace_kept() {
        let result = decode_attribute(b"a&#10;b", &none()).unwrap();
        assert_eq!(result.as_ref(), b"a\nb");
    }

    #[test]
    fn test_entity_whitespace_normalized_in_attribute() {
        let table = declared(&[("path", "M0 0&#10;Z")]);
        assert_eq!(decode_attribute(b"&path;", &table).unwrap().as_ref(), b"M0 0 Z");
        assert_eq!(decode_text(b"&path;", &table).unwrap().as_ref(), b"M0 0\nZ");
    }

    #[test]
    fn test_expand_char_refs_keeps_entity_refs() {
        assert_eq!(expand_char_refs(b"&#65;&amp;&x;").unwrap(), b"A&amp;&x;");
        assert!(expand_char_refs(b"&#xZZ;").is_err());
    }

    #[test]
    fn test_attribute_plain_borrows() {
        assert!(matches!(decode_attribute(b"M0 0", &none()).unwrap(), Cow::Borrowed(_)));
    }
}
