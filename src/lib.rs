//! iconcss - Icon font codepoint assignment
//!
//! Assigns stable codepoints to a sequence of SVG icons, renames each icon to
//! `u<HEX>-<name>.svg` for font compilers, and renders a stylesheet for the
//! resulting font. Codepoints can be kept stable across builds with a
//! persisted glyph map.

pub mod allocator;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod output;
pub mod store;
pub mod stream;
pub mod template;
pub mod types;

pub use allocator::{AllocationState, Assignment, CodepointAllocator};
pub use config::{FixedCodepoints, IconConfig, CONFIG_FILENAME};
pub use discovery::scan_inputs;
pub use error::{IconError, Result};
pub use store::GlyphMapStore;
pub use stream::{IconStream, RunSummary, Transform};
pub use template::{
    BuiltinTemplate, Engines, MustacheEngine, StylesheetContext, StylesheetEmitter,
    TemplateEngine, TemplateSource,
};
pub use types::{CodePoint, Contents, FileItem, GlyphEntry};
