//! Error types for glyph extraction.

use crate::core::tokenizer::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Every way a run can fail. None of them is recoverable.
#[derive(Debug, Error)]
pub enum Error {
    /// The input font could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input font is not well-formed XML.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// A mapped glyph has no `d` attribute to export.
    #[error("glyph for {unicode:?} has no `d` attribute")]
    MissingPathData { unicode: String },

    /// An output file could not be created or written.
    #[error("failed to write {}: {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A convenience `Result` type alias using the crate's `Error` type.
pub type Result<T> = std::result::Result<T, Error>;
