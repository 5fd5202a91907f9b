//! Keyboard-row key table
//!
//! Three keyboard rows name the three tile suits: the home row is `b`, the
//! top row is `c` and the bottom row is `d`. A character's position in its
//! row is the tile number, counted from zero.

use std::collections::HashMap;
use std::fmt;

/// Row label, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    B,
    C,
    D,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::B, Group::C, Group::D];

    pub fn label(self) -> char {
        match self {
            Group::B => 'b',
            Group::C => 'c',
            Group::D => 'd',
        }
    }

    /// The nine characters that map into this group
    fn row(self) -> &'static str {
        match self {
            Group::B => "asdfghjkl",
            Group::C => "qwertyuio",
            Group::D => "zxcvbnm,.",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where a character lands: group plus position within the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySlot {
    pub group: Group,
    /// Always in `0..9`
    pub position: u8,
}

impl KeySlot {
    /// Output file name, e.g. `b-0.svg`
    pub fn file_name(&self) -> String {
        format!("{}-{}.svg", self.group, self.position)
    }
}

impl fmt::Display for KeySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.group, self.position)
    }
}

/// Immutable character -> slot mapping
#[derive(Debug, Clone)]
pub struct KeyTable {
    slots: HashMap<char, KeySlot>,
}

impl KeyTable {
    /// Number of characters per group
    pub const ROW_LEN: usize = 9;

    /// The fixed 27-entry table
    pub fn standard() -> Self {
        let mut slots = HashMap::with_capacity(Group::ALL.len() * Self::ROW_LEN);
        for group in Group::ALL {
            for (position, ch) in group.row().chars().enumerate() {
                let previous = slots.insert(ch, KeySlot { group, position: position as u8 });
                debug_assert!(previous.is_none(), "{ch:?} appears in two rows");
            }
        }
        KeyTable { slots }
    }

    /// Slot for a `unicode` attribute value.
    ///
    /// Only a value consisting of exactly one mapped character has a slot.
    pub fn lookup(&self, unicode: &str) -> Option<KeySlot> {
        let mut chars = unicode.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => self.get(ch),
            _ => None,
        }
    }

    pub fn get(&self, ch: char) -> Option<KeySlot> {
        self.slots.get(&ch).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Entries in table order: group by group, then by position
    pub fn iter(&self) -> impl Iterator<Item = (char, KeySlot)> + '_ {
        Group::ALL.into_iter().flat_map(move |group| {
            group
                .row()
                .chars()
                .filter_map(move |ch| self.get(ch).map(|slot| (ch, slot)))
        })
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::standard()
    }
}
