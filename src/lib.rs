//! glyphsplit - split an SVG font into one SVG file per mahjong tile
//!
//! Layers:
//! - `core`: byte scanner, tokenizer, entity and encoding handling
//! - `reader`: zero-copy pull parser producing `XmlEvent`s
//! - `dom`: arena document with namespace-qualified tags and tag-path selection
//! - `glyph`: key table and per-glyph SVG export

pub mod core;
pub mod dom;
pub mod error;
pub mod glyph;
pub mod reader;

pub use dom::{select, tag_matches, Element, TreeNode, XmlDocument};
pub use error::{Error, Result};
pub use glyph::{run, ExportConfig, ExportSummary, GlyphExporter, KeySlot, KeyTable};
