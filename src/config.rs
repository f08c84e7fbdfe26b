//! Pipeline configuration (iconcss.yaml).
//!
//! Mirrors the options accepted by the stream transform. Every field has a
//! default except `fontName`, which [`IconConfig::validate`] insists on.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IconError, Result};
use crate::types::CodePoint;

/// The name of the config file looked up by the CLI.
pub const CONFIG_FILENAME: &str = "iconcss.yaml";

/// Options for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IconConfig {
    /// Font family name injected into the stylesheet. Required.
    pub font_name: Option<String>,

    /// Template selector: `css`, `scss`, `sass`, `less` or a template path.
    pub path: String,

    /// File name of the generated stylesheet, relative to the items' base.
    pub target_path: PathBuf,

    /// Font URL prefix injected into the stylesheet.
    pub font_path: String,

    /// Template engine identifier.
    pub engine: String,

    /// First codepoint handed out by the counter.
    pub first_glyph: CodePoint,

    /// Inline name to codepoint overrides, or `false`.
    pub fixed_codepoints: FixedCodepoints,

    /// Class prefix used by the templates.
    pub css_class: String,

    /// Extra names for an icon, sharing its codepoint.
    pub aliases: HashMap<String, Vec<String>>,

    /// Cache-busting token appended to font URLs.
    pub cache_buster: String,

    /// Persisted glyph map. Empty disables persisted-map mode.
    pub glyph_map_file_path: String,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            font_name: None,
            path: "css".to_string(),
            target_path: PathBuf::from("_icons.css"),
            font_path: "./".to_string(),
            engine: "mustache".to_string(),
            first_glyph: CodePoint::DEFAULT_FIRST,
            fixed_codepoints: FixedCodepoints::default(),
            css_class: "icon".to_string(),
            aliases: HashMap::new(),
            cache_buster: String::new(),
            glyph_map_file_path: String::new(),
        }
    }
}

impl IconConfig {
    /// Create a config with defaults and the given font name.
    pub fn new(font_name: impl Into<String>) -> Self {
        Self {
            font_name: Some(font_name.into()),
            ..Default::default()
        }
    }

    /// Load config from an iconcss.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| IconError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse config from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| IconError::Config {
            message: format!("Invalid config: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })
    }

    /// Check the options that must hold before any item is processed.
    pub fn validate(&self) -> Result<()> {
        if self.font_name().is_none() {
            return Err(IconError::config(
                "Missing option \"fontName\"",
                Some("Set fontName in iconcss.yaml or pass --font-name"),
            ));
        }

        let mut seen: HashMap<CodePoint, &str> = HashMap::new();
        for (name, code_point) in self.fixed_codepoints.iter() {
            if let Some(other) = seen.insert(code_point, name) {
                return Err(IconError::Config {
                    message: format!(
                        "fixedCodepoints gives {} to both \"{}\" and \"{}\"",
                        code_point, other, name
                    ),
                    help: Some("Use aliases to share a codepoint between names".to_string()),
                });
            }
        }

        Ok(())
    }

    /// The font name, if set and non-empty.
    pub fn font_name(&self) -> Option<&str> {
        self.font_name.as_deref().filter(|n| !n.is_empty())
    }

    /// The persisted glyph map path, if persisted-map mode is on.
    pub fn glyph_map_path(&self) -> Option<&Path> {
        (!self.glyph_map_file_path.is_empty()).then(|| Path::new(&self.glyph_map_file_path))
    }

    /// Aliases configured for an icon.
    pub fn aliases_for(&self, file_name: &str) -> &[String] {
        self.aliases.get(file_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `?<cacheBuster>` or an empty string.
    pub fn cache_buster_query_string(&self) -> String {
        if self.cache_buster.is_empty() {
            String::new()
        } else {
            format!("?{}", self.cache_buster)
        }
    }
}

/// Inline codepoint overrides.
///
/// Written as `false` (disabled) or a mapping of icon name to codepoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FixedRepr", into = "FixedRepr")]
pub struct FixedCodepoints(BTreeMap<String, CodePoint>);

impl FixedCodepoints {
    pub fn new(map: BTreeMap<String, CodePoint>) -> Self {
        Self(map)
    }

    pub fn get(&self, file_name: &str) -> Option<CodePoint> {
        self.0.get(file_name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, CodePoint)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, CodePoint)> for FixedCodepoints {
    fn from_iter<I: IntoIterator<Item = (S, CodePoint)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FixedRepr {
    Flag(bool),
    Map(BTreeMap<String, CodePoint>),
}

impl TryFrom<FixedRepr> for FixedCodepoints {
    type Error = String;

    fn try_from(repr: FixedRepr) -> std::result::Result<Self, String> {
        match repr {
            FixedRepr::Flag(false) => Ok(Self::default()),
            FixedRepr::Flag(true) => {
                Err("fixedCodepoints must be false or a mapping of name to codepoint".to_string())
            }
            FixedRepr::Map(map) => Ok(Self(map)),
        }
    }
}

impl From<FixedCodepoints> for FixedRepr {
    fn from(fixed: FixedCodepoints) -> Self {
        if fixed.0.is_empty() {
            FixedRepr::Flag(false)
        } else {
            FixedRepr::Map(fixed.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = IconConfig::default();

        assert_eq!(config.path, "css");
        assert_eq!(config.target_path, PathBuf::from("_icons.css"));
        assert_eq!(config.font_path, "./");
        assert_eq!(config.engine, "mustache");
        assert_eq!(config.first_glyph, CodePoint::new(0xE001));
        assert!(config.fixed_codepoints.is_empty());
        assert_eq!(config.css_class, "icon");
        assert!(config.glyph_map_path().is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
fontName: Icons
path: scss
targetPath: _icons.scss
fontPath: ../fonts/
firstGlyph: "0xF101"
fixedCodepoints:
  home: 0xF000
  user: "F001"
cssClass: ico
aliases:
  home: [house, start]
cacheBuster: abc123
glyphMapFilePath: glyphs.json
"#;
        let config = IconConfig::parse(yaml).unwrap();

        assert_eq!(config.font_name(), Some("Icons"));
        assert_eq!(config.path, "scss");
        assert_eq!(config.target_path, PathBuf::from("_icons.scss"));
        assert_eq!(config.first_glyph, CodePoint::new(0xF101));
        assert_eq!(
            config.fixed_codepoints.get("home"),
            Some(CodePoint::new(0xF000))
        );
        assert_eq!(
            config.fixed_codepoints.get("user"),
            Some(CodePoint::new(0xF001))
        );
        assert_eq!(config.aliases_for("home"), ["house", "start"]);
        assert!(config.aliases_for("user").is_empty());
        assert_eq!(config.cache_buster_query_string(), "?abc123");
        assert_eq!(config.glyph_map_path(), Some(Path::new("glyphs.json")));
    }

    #[test]
    fn test_parse_fixed_codepoints_false() {
        let config = IconConfig::parse("fontName: Icons\nfixedCodepoints: false").unwrap();
        assert!(config.fixed_codepoints.is_empty());
    }

    #[test]
    fn test_parse_fixed_codepoints_true_rejected() {
        assert!(IconConfig::parse("fixedCodepoints: true").is_err());
    }

    #[test]
    fn test_parse_empty_config() {
        let config = IconConfig::parse("").unwrap();
        assert_eq!(config, IconConfig::default());
    }

    #[test]
    fn test_validate_requires_font_name() {
        let err = IconConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("fontName"));

        let blank = IconConfig::new("");
        assert!(blank.validate().is_err());

        assert!(IconConfig::new("Icons").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_fixed_codepoints() {
        let config = IconConfig {
            fixed_codepoints: [
                ("home", CodePoint::new(0xF000)),
                ("house", CodePoint::new(0xF000)),
            ]
            .into_iter()
            .collect(),
            ..IconConfig::new("Icons")
        };

        assert!(matches!(config.validate(), Err(IconError::Config { .. })));
    }

    #[test]
    fn test_cache_buster_query_string_empty() {
        assert_eq!(IconConfig::new("Icons").cache_buster_query_string(), "");
    }
}
