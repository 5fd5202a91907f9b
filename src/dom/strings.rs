//! String Interning Pool
//!
//! Element names, attribute names and attribute values are stored once in a
//! shared text buffer and referred to by `u32` IDs. SVG fonts repeat the same
//! handful of names thousands of times, so deduplication keeps the arena small.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// ID of the empty string; always present
pub const EMPTY: u32 = 0;

/// (offset, length) into the pool buffer
#[derive(Debug, Clone, Copy)]
struct Span {
    offset: u32,
    len: u32,
}

/// String interning pool
///
/// - `entries`: span for each interned string ID
/// - `data`: one buffer holding every distinct string back to back
/// - `hash_index`: hash -> IDs with that hash (collisions are rare)
#[derive(Debug)]
pub struct StringPool {
    entries: Vec<Span>,
    data: String,
    hash_index: HashMap<u64, Vec<u32>>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    pub fn new() -> Self {
        let mut pool = StringPool {
            entries: Vec::with_capacity(256),
            data: String::with_capacity(4096),
            hash_index: HashMap::new(),
        };
        pool.entries.push(Span { offset: 0, len: 0 });
        pool
    }

    #[inline]
    fn compute_hash(s: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a string, returning the ID of an equal string if one exists
    pub fn intern(&mut self, s: &str) -> u32 {
        if s.is_empty() {
            return EMPTY;
        }

        let hash = Self::compute_hash(s);
        if let Some(ids) = self.hash_index.get(&hash) {
            if let Some(&id) = ids.iter().find(|&&id| self.get(id) == s) {
                return id;
            }
        }

        let span = Span {
            offset: self.data.len() as u32,
            len: s.len() as u32,
        };
        self.data.push_str(s);

        let id = self.entries.len() as u32;
        self.entries.push(span);
        self.hash_index.entry(hash).or_default().push(id);
        id
    }

    /// Look up a string without interning it
    pub fn find(&self, s: &str) -> Option<u32> {
        if s.is_empty() {
            return Some(EMPTY);
        }
        let ids = self.hash_index.get(&Self::compute_hash(s))?;
        ids.iter().copied().find(|&id| self.get(id) == s)
    }

    /// Resolve an ID; unknown IDs resolve to the empty string
    #[inline]
    pub fn get(&self, id: u32) -> &str {
        match self.entries.get(id as usize) {
            Some(span) => {
                let start = span.offset as usize;
                &self.data[start..start + span.len as usize]
            }
            None => "",
        }
    }
}
