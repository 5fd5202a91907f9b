//! Glyph export
//!
//! Walks `defs/font/glyph` under the document root and writes every glyph
//! whose `unicode` is in the key table to `<out_dir>/<group>-<position>.svg`.
//! Each file is created, written and closed before the next glyph is looked
//! at. The first error stops the run; files already written stay on disk.

use super::keys::KeyTable;
use crate::dom::{select, XmlDocument};
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Font file read when no input is given
pub const DEFAULT_INPUT: &str = "GL-MahjongTile.svg";
/// Directory the glyph files are written to; it must already exist
pub const DEFAULT_OUT_DIR: &str = "gl-mahjongtile-svg";
/// Tag path from the root element to the glyphs
pub const GLYPH_PATH: [&str; 3] = ["defs", "font", "glyph"];
/// viewBox shared by every exported tile
pub const VIEW_BOX: &str = "30 -115 580 830";

/// Where to read the font and where to put the glyphs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub input: PathBuf,
    pub out_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            input: PathBuf::from(DEFAULT_INPUT),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
        }
    }
}

/// Counts from one export pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Elements reached through `defs/font/glyph`
    pub matched: usize,
    /// Files written, overwrites of an earlier glyph's file included
    pub written: usize,
    /// Glyphs without a `unicode` attribute
    pub missing_unicode: usize,
    /// Glyphs whose `unicode` is not in the key table
    pub unmapped: usize,
}

/// Standalone SVG document for one glyph's path data.
///
/// `d` is inserted as is, without escaping.
pub fn render_svg(d: &str) -> String {
    format!(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{VIEW_BOX}"><g><path d="{d}" /></g></svg>"#)
}

/// Writes mapped glyphs of a parsed font into one directory
#[derive(Debug, Clone)]
pub struct GlyphExporter {
    keys: KeyTable,
    out_dir: PathBuf,
}

impl GlyphExporter {
    /// Exporter using the standard key table
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self::with_keys(KeyTable::standard(), out_dir)
    }

    pub fn with_keys(keys: KeyTable, out_dir: impl Into<PathBuf>) -> Self {
        GlyphExporter {
            keys,
            out_dir: out_dir.into(),
        }
    }

    /// Export every mapped glyph of `doc`, in document order.
    ///
    /// # Errors
    /// - `MissingPathData` if a mapped glyph has no `d` attribute
    /// - `WriteOutput` if an output file cannot be created or written
    pub fn export(&self, doc: &XmlDocument) -> Result<ExportSummary> {
        let mut summary = ExportSummary::default();

        for glyph in select(doc.root(), &GLYPH_PATH) {
            summary.matched += 1;

            let Some(unicode) = glyph.attribute("unicode") else {
                debug!("Skipping glyph #{} without unicode attribute", glyph.id());
                summary.missing_unicode += 1;
                continue;
            };
            let Some(slot) = self.keys.lookup(unicode) else {
                debug!("Skipping unmapped glyph {:?}", unicode);
                summary.unmapped += 1;
                continue;
            };
            let d = glyph.attribute("d").ok_or_else(|| Error::MissingPathData {
                unicode: unicode.to_owned(),
            })?;

            let path = self.out_dir.join(slot.file_name());
            write_glyph(&path, d)?;
            debug!("Wrote glyph {:?} as {} to {}", unicode, slot, path.display());
            summary.written += 1;
        }

        info!(
            "Exported {} of {} glyphs ({} without unicode, {} unmapped)",
            summary.written, summary.matched, summary.missing_unicode, summary.unmapped
        );
        Ok(summary)
    }
}

/// Create or truncate `path` and write one glyph document; the file is closed on return
fn write_glyph(path: &Path, d: &str) -> Result<()> {
    let write_err = |source| Error::WriteOutput {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(write_err)?;
    file.write_all(render_svg(d).as_bytes()).map_err(write_err)?;
    Ok(())
}

/// Read and parse the configured font, then export its glyphs
pub fn run(config: &ExportConfig) -> Result<ExportSummary> {
    info!("Reading font: {}", config.input.display());
    let bytes = fs::read(&config.input).map_err(|source| Error::ReadInput {
        path: config.input.clone(),
        source,
    })?;

    let doc = XmlDocument::parse(&bytes).map_err(|source| Error::Parse {
        path: config.input.clone(),
        source,
    })?;
    debug!("Parsed {} elements from {}", doc.element_count(), config.input.display());

    GlyphExporter::new(&config.out_dir).export(&doc)
}
