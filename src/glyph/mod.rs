//! Glyph extraction: the key table and the per-glyph SVG writer.

pub mod export;
pub mod keys;

pub use export::{render_svg, run, ExportConfig, ExportSummary, GlyphExporter};
pub use keys::{Group, KeySlot, KeyTable};
