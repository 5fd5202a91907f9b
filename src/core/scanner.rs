//! Byte scanner for XML markup
//!
//! Delimiter searches go through memchr, which picks SSE2/AVX2/NEON at
//! runtime. Everything else is plain cursor arithmetic over the input slice.

use memchr::{memchr, memmem};

/// Cursor over an XML byte slice
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.input[start..end]
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.remaining().starts_with(needle)
    }

    /// Skip XML whitespace (space, tab, LF, CR)
    #[inline]
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if !is_whitespace(b) {
                break;
            }
            self.pos += 1;
        }
    }

    /// Absolute position of the next '<'
    #[inline]
    pub fn find_tag_start(&self) -> Option<usize> {
        memchr(b'<', self.remaining()).map(|i| self.pos + i)
    }

    /// Absolute position of the first '>' that is outside a quoted attribute value
    pub fn find_tag_end_quoted(&self) -> Option<usize> {
        let mut quote: Option<u8> = None;
        for (offset, &b) in self.remaining().iter().enumerate() {
            match (quote, b) {
                (None, b'"' | b'\'') => quote = Some(b),
                (Some(q), _) if q == b => quote = None,
                (None, b'>') => return Some(self.pos + offset),
                _ => {}
            }
        }
        None
    }

    /// Absolute position of the next occurrence of `needle`
    #[inline]
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        memmem::find(self.remaining(), needle).map(|i| self.pos + i)
    }

    /// Absolute position of the '>' closing a DOCTYPE declaration.
    ///
    /// Skips over quoted literals and a bracketed internal subset.
    pub fn find_doctype_end(&self) -> Option<usize> {
        let mut quote: Option<u8> = None;
        let mut subset_depth = 0usize;
        for (offset, &b) in self.remaining().iter().enumerate() {
            if let Some(q) = quote {
                if q == b {
                    quote = None;
                }
                continue;
            }
            match b {
                b'"' | b'\'' => quote = Some(b),
                b'[' => subset_depth += 1,
                b']' => subset_depth = subset_depth.saturating_sub(1),
                b'>' if subset_depth == 0 => return Some(self.pos + offset),
                _ => {}
            }
        }
        None
    }

    /// Read an XML name at the cursor, advancing past it
    pub fn read_name(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        let first = self.peek()?;
        if !is_name_start_char(first) {
            return None;
        }
        self.pos += 1;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        Some(&self.input[start..self.pos])
    }
}

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Name start byte: ASCII letter, '_', ':' or any non-ASCII UTF-8 byte
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

#[inline]
pub fn is_name_char(b: u8) -> bool {
    is_name_start_char(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

/// True when every byte of `name` is a legal XML name byte and the first is a legal start
pub fn is_valid_name(name: &[u8]) -> bool {
    match name.split_first() {
        Some((&first, rest)) => is_name_start_char(first) && rest.iter().all(|&b| is_name_char(b)),
        None => false,
    }
}
