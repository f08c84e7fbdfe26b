//! Core domain types.
//!
//! - `CodePoint` - a glyph codepoint, written as uppercase hex
//! - `GlyphEntry` - a named glyph, possibly an alias of another
//! - `FileItem` - a file moving through the pipeline

mod codepoint;
mod glyph;
mod item;

pub use codepoint::CodePoint;
pub use glyph::GlyphEntry;
pub use item::{Contents, FileItem, ICON_EXTENSION};
