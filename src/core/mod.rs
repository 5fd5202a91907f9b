//! Core XML parsing primitives
//!
//! - Scanner: memchr-accelerated delimiter detection
//! - Tokenizer: pull tokenizer for XML markup
//! - Entities: predefined, declared and character reference decoding
//! - DTD: entity declarations from the DOCTYPE internal subset
//! - Attributes: attribute list parsing and value normalization
//! - Encoding: UTF-16 detection and conversion to UTF-8

pub mod attributes;
pub mod dtd;
pub mod encoding;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
