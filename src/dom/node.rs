//! XML Node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// The document node always sits at index 0
pub const DOCUMENT_NODE: NodeId = 0;

/// An element (or the document) in the arena.
///
/// Only elements are stored: text, comments and processing instructions are
/// checked for well-formedness and then dropped.
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// String pool ID of the tag in Clark notation; EMPTY for the document
    pub tag_id: u32,
    /// Start of attributes in attribute arena
    pub attr_start: u32,
    pub attr_count: u32,
}

impl XmlNode {
    pub fn document() -> Self {
        Self::element(0)
    }

    pub fn element(tag_id: u32) -> Self {
        XmlNode {
            first_child: None,
            last_child: None,
            next_sibling: None,
            tag_id,
            attr_start: 0,
            attr_count: 0,
        }
    }
}

/// Stored attribute: both halves are string pool IDs
#[derive(Debug, Clone, Copy)]
pub struct XmlAttribute {
    /// Name in Clark notation
    pub name_id: u32,
    pub value_id: u32,
}
