//! XML Reader Module
//!
//! - SliceReader: pull reader over a borrowed byte slice
//! - Events: XML event types for pull parsing

pub mod events;
pub mod slice;
