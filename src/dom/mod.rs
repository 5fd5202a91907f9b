//! DOM Module - Arena-based XML Document
//!
//! - Arena allocation for element nodes, linked by NodeId (u32) indices
//! - String interning for tags, attribute names and values
//! - Namespace resolution stack, names stored in Clark notation
//! - Tag-path selection over any tree implementing `TreeNode`

pub mod document;
pub mod namespace;
pub mod node;
pub mod select;
pub mod strings;

pub use document::{Children, Element, XmlDocument};
pub use node::{NodeId, XmlAttribute, XmlNode};
pub use select::{select, tag_matches, PathMatches};
pub use strings::StringPool;

/// Read access to a tree of tagged nodes.
///
/// This is all the path matcher needs, so it can walk a parsed
/// `XmlDocument` or any other tree with named nodes.
pub trait TreeNode: Sized {
    /// Direct children in document order
    type Children: Iterator<Item = Self>;

    /// Tag name, possibly namespace-qualified (`{uri}local`)
    fn tag(&self) -> &str;

    fn children(&self) -> Self::Children;
}
