//! XML Tokenizer - pull-style token extraction
//!
//! Splits a document into tokens:
//! - Element start/end/empty tags
//! - Text content
//! - CDATA sections
//! - Comments
//! - Processing instructions and the XML declaration
//! - DOCTYPE declarations (internal entity declarations are collected)
//!
//! The tokenizer only checks lexical well-formedness. Nesting and namespace
//! rules are enforced by the document builder.

use super::dtd::EntityTable;
use super::entities::decode_text;
use super::scanner::{is_valid_name, is_whitespace, Scanner};
use std::borrow::Cow;
use thiserror::Error;

/// Type of XML token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: <element>
    StartTag,
    /// Element end tag: </element>
    EndTag,
    /// Empty element: <element/>
    EmptyTag,
    /// Text content
    Text,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Comment: <!--...-->
    Comment,
    /// Processing instruction: <?target ...?>
    ProcessingInstruction,
    /// XML declaration: <?xml ...?>
    XmlDeclaration,
    /// DOCTYPE declaration
    DocType,
}

/// A lexed XML token
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input (start, end)
    pub span: (usize, usize),
    /// For tags and PIs: the name or target
    pub name: Option<&'a [u8]>,
    /// For text/cdata/comments: the content, entity-decoded for text
    pub content: Option<Cow<'a, [u8]>>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize)) -> Self {
        Token {
            kind,
            span,
            name: None,
            content: None,
        }
    }

    fn with_name(mut self, name: &'a [u8]) -> Self {
        self.name = Some(name);
        self
    }

    fn with_content(mut self, content: Cow<'a, [u8]>) -> Self {
        self.content = Some(content);
        self
    }
}

/// A well-formedness violation, located by byte offset into the decoded input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

/// XML tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    entities: EntityTable,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            entities: EntityTable::new(),
            done: false,
        }
    }

    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Entities declared by the DOCTYPE read so far
    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    fn error(&self, message: &str, position: usize) -> ParseError {
        ParseError::new(message, position)
    }

    /// Get the next token, `Ok(None)` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        if self.done || self.scanner.is_eof() {
            self.done = true;
            return Ok(None);
        }

        let token = match self.scanner.peek() {
            Some(b'<') => self.parse_markup(),
            _ => self.parse_text(),
        };
        if token.is_err() {
            self.done = true;
        }
        token.map(Some)
    }

    /// Parse markup starting with '<'
    fn parse_markup(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.scanner.position();
        self.scanner.advance(1);

        match self.scanner.peek() {
            Some(b'/') => self.parse_end_tag(start),
            Some(b'!') => self.parse_bang_markup(start),
            Some(b'?') => self.parse_pi(start),
            Some(_) => self.parse_start_tag(start),
            None => Err(self.error("Unexpected end of input after '<'", start)),
        }
    }

    /// Parse a start tag or empty element tag
    fn parse_start_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| self.error("Invalid element name", start))?;

        match self.scanner.peek() {
            Some(b) if is_whitespace(b) || b == b'>' || b == b'/' => {}
            _ => return Err(self.error("Invalid character in element name", self.scanner.position())),
        }

        let end = self
            .scanner
            .find_tag_end_quoted()
            .ok_or_else(|| self.error("Unterminated start tag", start))?;

        let is_empty = self.scanner.slice(start, end).ends_with(b"/");

        self.scanner.set_position(end + 1);
        let kind = if is_empty { TokenKind::EmptyTag } else { TokenKind::StartTag };
        Ok(Token::new(kind, (start, end + 1)).with_name(name))
    }

    /// Parse an end tag
    fn parse_end_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '/'

        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| self.error("Invalid element name in end tag", start))?;

        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'>') {
            return Err(self.error("End tag cannot have attributes or other content", self.scanner.position()));
        }
        self.scanner.advance(1);

        Ok(Token::new(TokenKind::EndTag, (start, self.scanner.position())).with_name(name))
    }

    /// Parse markup starting with '!' (comment, CDATA, DOCTYPE)
    fn parse_bang_markup(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '!'

        if self.scanner.starts_with(b"--") {
            self.parse_comment(start)
        } else if self.scanner.starts_with(b"[CDATA[") {
            self.parse_cdata(start)
        } else if self.scanner.starts_with(b"DOCTYPE") {
            self.parse_doctype(start)
        } else {
            Err(self.error("Invalid declaration - expected comment, CDATA, or DOCTYPE", start))
        }
    }

    /// Parse a comment <!--...-->
    fn parse_comment(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(2); // Skip '--'
        let content_start = self.scanner.position();

        let end = self
            .scanner
            .find(b"--")
            .ok_or_else(|| self.error("Unterminated comment", start))?;
        self.scanner.set_position(end);
        if !self.scanner.starts_with(b"-->") {
            return Err(self.error("'--' is not allowed inside a comment", end));
        }

        let content = self.scanner.slice(content_start, end);
        self.scanner.set_position(end + 3);
        Ok(Token::new(TokenKind::Comment, (start, end + 3)).with_content(Cow::Borrowed(content)))
    }

    /// Parse a CDATA section <![CDATA[...]]>
    fn parse_cdata(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(7); // Skip '[CDATA['
        let content_start = self.scanner.position();

        let end = self
            .scanner
            .find(b"]]>")
            .ok_or_else(|| self.error("Unterminated CDATA section", start))?;

        let content = self.scanner.slice(content_start, end);
        self.scanner.set_position(end + 3);
        Ok(Token::new(TokenKind::CData, (start, end + 3)).with_content(Cow::Borrowed(content)))
    }

    /// Parse a DOCTYPE declaration, internal subset included
    fn parse_doctype(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(7); // Skip 'DOCTYPE'

        let end = self
            .scanner
            .find_doctype_end()
            .ok_or_else(|| self.error("Unterminated DOCTYPE declaration", start))?;

        let entities = EntityTable::from_doctype(self.scanner.slice(start, end + 1))
            .map_err(|msg| self.error(msg, start))?;
        self.entities = entities;

        self.scanner.set_position(end + 1);
        Ok(Token::new(TokenKind::DocType, (start, end + 1)))
    }

    /// Parse a processing instruction or the XML declaration
    fn parse_pi(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '?'

        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| self.error("Invalid processing instruction target", start))?;

        match self.scanner.peek() {
            Some(b) if is_whitespace(b) => {}
            Some(b'?') if self.scanner.starts_with(b"?>") => {}
            _ => return Err(self.error("Invalid character after PI target name", self.scanner.position())),
        }

        let content_start = self.scanner.position();
        let end = self
            .scanner
            .find(b"?>")
            .ok_or_else(|| self.error("Unterminated processing instruction", start))?;

        let content = self.scanner.slice(content_start, end);
        self.scanner.set_position(end + 2);

        let kind = if name == b"xml" {
            TokenKind::XmlDeclaration
        } else if name.eq_ignore_ascii_case(b"xml") {
            return Err(self.error("Processing instruction target 'xml' is reserved", start));
        } else {
            TokenKind::ProcessingInstruction
        };
        Ok(Token::new(kind, (start, end + 2))
            .with_name(name)
            .with_content(Cow::Borrowed(content)))
    }

    /// Parse text content up to the next '<'
    fn parse_text(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.scanner.position();
        let end = self
            .scanner
            .find_tag_start()
            .unwrap_or(start + self.scanner.remaining().len());

        let raw = self.scanner.slice(start, end);
        let decoded = decode_text(raw, &self.entities).map_err(|msg| self.error(msg, start))?;

        self.scanner.set_position(end);
        Ok(Token::new(TokenKind::Text, (start, end)).with_content(decoded))
    }
}

/// Validate a qualified name outside of the scanner (used for prefixes and local parts)
pub fn validate_name(name: &[u8]) -> Result<(), &'static str> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err("Invalid XML name")
    }
}
