//! Glyph entries collected while assigning codepoints.

use serde::{Deserialize, Serialize};

use super::CodePoint;

/// One named glyph and its codepoint.
///
/// Aliases share the codepoint of the icon they point at and record that
/// icon's name in `original_file_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphEntry {
    pub file_name: String,
    pub code_point: CodePoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
}

impl GlyphEntry {
    /// Create an entry for an icon file.
    pub fn new(file_name: impl Into<String>, code_point: CodePoint) -> Self {
        Self {
            file_name: file_name.into(),
            code_point,
            original_file_name: None,
        }
    }

    /// Create an alias entry pointing at `original`.
    pub fn alias(name: impl Into<String>, original: &GlyphEntry) -> Self {
        Self {
            file_name: name.into(),
            code_point: original.code_point,
            original_file_name: Some(original.file_name.clone()),
        }
    }

    /// Check if this entry is an alias of another glyph.
    pub fn is_alias(&self) -> bool {
        self.original_file_name.is_some()
    }
}
