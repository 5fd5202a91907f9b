//! Slice reader
//!
//! Turns tokenizer output into events over a borrowed byte slice. Names and
//! unescaped content reference the input directly.

use super::events::{EndElement, StartElement, XmlEvent};
use crate::core::attributes::{parse_attributes, Attribute};
use crate::core::tokenizer::{ParseError, Token, TokenKind, Tokenizer};

/// Pull reader over a byte slice
pub struct SliceReader<'a> {
    input: &'a [u8],
    tokenizer: Tokenizer<'a>,
}

impl<'a> SliceReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        SliceReader {
            input,
            tokenizer: Tokenizer::new(input),
        }
    }

    /// Byte offset just past the last event read
    pub fn position(&self) -> usize {
        self.tokenizer.position()
    }

    /// Get the next XML event, `Ok(None)` at end of input
    pub fn next_event(&mut self) -> Result<Option<XmlEvent<'a>>, ParseError> {
        let Some(token) = self.tokenizer.next_token()? else {
            return Ok(None);
        };

        let event = match token.kind {
            TokenKind::StartTag | TokenKind::EmptyTag => {
                let name = token.name.unwrap_or_default();
                let attrs = self.tag_attributes(&token, name.len())?;
                let elem = StartElement::new(name, attrs);
                if token.kind == TokenKind::EmptyTag {
                    XmlEvent::EmptyElement(elem)
                } else {
                    XmlEvent::StartElement(elem)
                }
            }
            TokenKind::EndTag => XmlEvent::EndElement(EndElement::new(token.name.unwrap_or_default())),
            TokenKind::Text => XmlEvent::Text(token.content.unwrap_or_default()),
            TokenKind::CData => XmlEvent::CData(self.borrowed_content(&token, 9, 3)),
            TokenKind::Comment => XmlEvent::Comment(self.borrowed_content(&token, 4, 3)),
            TokenKind::ProcessingInstruction => {
                let target = token.name.unwrap_or_default();
                let data = self.borrowed_content(&token, 2 + target.len(), 2);
                XmlEvent::ProcessingInstruction {
                    target,
                    data: data.trim_ascii_start(),
                }
            }
            TokenKind::XmlDeclaration => XmlEvent::XmlDeclaration,
            TokenKind::DocType => {
                let (start, end) = token.span;
                XmlEvent::DocType(&self.input[start..end])
            }
        };
        Ok(Some(event))
    }

    /// Content between a fixed-length opener and closer, straight from the input
    fn borrowed_content(&self, token: &Token<'a>, open: usize, close: usize) -> &'a [u8] {
        let (start, end) = token.span;
        &self.input[start + open..end - close]
    }

    /// Parse the attribute list of a start or empty tag
    fn tag_attributes(&self, token: &Token<'a>, name_len: usize) -> Result<Vec<Attribute<'a>>, ParseError> {
        let (start, end) = token.span;
        let tag = &self.input[start..end];

        // '<' + name, then everything before '>' or '/>'
        let attr_start = 1 + name_len;
        let attr_end = if token.kind == TokenKind::EmptyTag {
            tag.len() - 2
        } else {
            tag.len() - 1
        };

        if attr_start >= attr_end {
            return Ok(Vec::new());
        }
        parse_attributes(&tag[attr_start..attr_end], self.tokenizer.entities())
            .map_err(|msg| ParseError::new(msg, start))
    }
}
