//! DOCTYPE internal subset
//!
//! Only internal general entities are collected, so that `&name;` references
//! in the document can be expanded. Element, attribute-list and notation
//! declarations, parameter entities, external entities, comments and PIs in
//! the subset are skipped over. External DTDs are never loaded.

use super::entities::expand_char_refs;
use super::scanner::{is_valid_name, is_whitespace};
use memchr::{memchr, memmem, memrchr};
use std::collections::HashMap;

/// General entities declared in the internal subset
#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    entities: HashMap<Vec<u8>, Vec<u8>>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the entity declarations of a complete `<!DOCTYPE ...>` markup
    pub fn from_doctype(doctype: &[u8]) -> Result<Self, &'static str> {
        let mut table = EntityTable::new();
        if let Some(subset) = internal_subset(doctype) {
            parse_subset(subset, &mut table)?;
        }
        Ok(table)
    }

    /// Declare an internal entity from its literal value.
    ///
    /// Character references are expanded now, entity references when the
    /// entity is used. The first declaration of a name is binding.
    pub fn declare(&mut self, name: &[u8], literal: &[u8]) -> Result<(), &'static str> {
        if self.entities.contains_key(name) {
            return Ok(());
        }
        let value = expand_char_refs(literal)?;
        self.entities.insert(name.to_vec(), value);
        Ok(())
    }

    /// Replacement text of a declared entity
    pub fn get(&self, name: &[u8]) -> Option<&[u8]> {
        self.entities.get(name).map(Vec::as_slice)
    }
}

/// The text between `[` and `]` of a DOCTYPE, if it has an internal subset
fn internal_subset(doctype: &[u8]) -> Option<&[u8]> {
    let mut quote: Option<u8> = None;
    for (i, &b) in doctype.iter().enumerate() {
        if let Some(q) = quote {
            if q == b {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'[' => {
                let body = &doctype[i + 1..];
                return memrchr(b']', body).map(|end| &body[..end]);
            }
            _ => {}
        }
    }
    None
}

fn parse_subset(subset: &[u8], table: &mut EntityTable) -> Result<(), &'static str> {
    let mut pos = 0;

    while pos < subset.len() {
        let rest = &subset[pos..];

        if is_whitespace(rest[0]) {
            pos += 1;
        } else if let Some(body) = rest.strip_prefix(b"<!--") {
            let end = memmem::find(body, b"-->").ok_or("Unterminated comment in DOCTYPE")?;
            pos += 4 + end + 3;
        } else if let Some(body) = rest.strip_prefix(b"<?") {
            let end = memmem::find(body, b"?>").ok_or("Unterminated processing instruction in DOCTYPE")?;
            pos += 2 + end + 2;
        } else if rest.starts_with(b"<!") {
            let len = declaration_len(rest).ok_or("Unterminated markup declaration")?;
            if let Some(body) = rest[..len - 1].strip_prefix(b"<!ENTITY") {
                parse_entity_decl(body, table)?;
            }
            pos += len;
        } else if rest[0] == b'%' {
            let semi = memchr(b';', rest).ok_or("Parameter entity reference missing ';'")?;
            pos += semi + 1;
        } else {
            return Err("Unexpected content in DOCTYPE internal subset");
        }
    }

    Ok(())
}

/// Length of a markup declaration up to and including its closing '>'
fn declaration_len(decl: &[u8]) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in decl.iter().enumerate() {
        match (quote, b) {
            (None, b'"' | b'\'') => quote = Some(b),
            (Some(q), _) if q == b => quote = None,
            (None, b'>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// `body` is everything between `<!ENTITY` and `>`
fn parse_entity_decl(body: &[u8], table: &mut EntityTable) -> Result<(), &'static str> {
    if !body.first().is_some_and(|&b| is_whitespace(b)) {
        return Err("Whitespace required after '<!ENTITY'");
    }
    let body = body.trim_ascii_start();
    if body.starts_with(b"%") {
        return Ok(());
    }

    let name_len = body
        .iter()
        .position(|&b| is_whitespace(b) || b == b'"' || b == b'\'')
        .unwrap_or(body.len());
    let name = &body[..name_len];
    if !is_valid_name(name) || memchr(b':', name).is_some() {
        return Err("Invalid entity name");
    }

    let rest = body[name_len..].trim_ascii_start();
    let quote = match rest.first() {
        Some(&q) if q == b'"' || q == b'\'' => q,
        // SYSTEM or PUBLIC: external, never loaded
        _ => return Ok(()),
    };
    let close = memchr(quote, &rest[1..]).ok_or("Unterminated entity value")?;
    let literal = &rest[1..1 + close];
    if !rest[close + 2..].trim_ascii().is_empty() {
        return Err("Unexpected content after entity value");
    }
    if memchr(b'%', literal).is_some() {
        return Err("Parameter entity reference in internal entity value");
    }
    table.declare(name, literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subset() {
        let table = EntityTable::from_doctype(
            b"<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">",
        )
        .unwrap();
        assert!(table.entities.is_empty());
    }

    #[test]
    fn test_illustrator_entities() {
        let doctype = b"<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"svg11.dtd\" [
  <!ENTITY ns_svg \"http://www.w3.org/2000/svg\">
  <!ENTITY ns_xlink 'http://www.w3.org/1999/xlink'>
]>";
        let table = EntityTable::from_doctype(doctype).unwrap();
        assert_eq!(table.entities.len(), 2);
        assert_eq!(table.get(b"ns_svg"), Some(b"http://www.w3.org/2000/svg" as &[u8]));
        assert_eq!(table.get(b"ns_xlink"), Some(b"http://www.w3.org/1999/xlink" as &[u8]));
    }

    #[test]
    fn test_other_declarations_skipped() {
        let doctype = b"<!DOCTYPE svg [
  <!-- tiles > everything -->
  <?keep this?>
  <!ELEMENT glyph EMPTY>
  <!ATTLIST glyph d CDATA #IMPLIED unicode CDATA '>'>
  <!ENTITY % pe \"ignored\">
  %pe;
  <!ENTITY logo SYSTEM \"logo.svg\">
  <!ENTITY tile \"M0 0\">
]>";
        let table = EntityTable::from_doctype(doctype).unwrap();
        assert_eq!(table.entities.len(), 1);
        assert_eq!(table.get(b"tile"), Some(b"M0 0" as &[u8]));
        assert_eq!(table.get(b"pe"), None);
        assert_eq!(table.get(b"logo"), None);
    }

    #[test]
    fn test_first_declaration_wins() {
        let table = EntityTable::from_doctype(b"<!DOCTYPE svg [<!ENTITY a \"1\"><!ENTITY a \"2\">]>").unwrap();
        assert_eq!(table.get(b"a"), Some(b"1" as &[u8]));
    }

    #[test]
    fn test_char_refs_expanded_at_declaration() {
        let table = EntityTable::from_doctype(b"<!DOCTYPE svg [<!ENTITY d \"M&#48; 0\">]>").unwrap();
        assert_eq!(table.get(b"d"), Some(b"M0 0" as &[u8]));
    }

    #[test]
    fn test_malformed_subset() {
        for doctype in [
            &b"<!DOCTYPE svg [<!ENTITY a \"1\">junk]>"[..],
            b"<!DOCTYPE svg [<!ENTITY a \"1]>",
            b"<!DOCTYPE svg [<!ENTITY 1a \"1\">]>",
            b"<!DOCTYPE svg [<!ENTITYa \"1\">]>",
            b"<!DOCTYPE svg [<!ENTITY a \"1\" extra>]>",
            b"<!DOCTYPE svg [<!ENTITY a \"&#0;\">]>",
            b"<!DOCTYPE svg [<!-- open ]>",
        ] {
            assert!(
                EntityTable::from_doctype(doctype).is_err(),
                "{:?} should be rejected",
                String::from_utf8_lossy(doctype)
            );
        }
    }
}
