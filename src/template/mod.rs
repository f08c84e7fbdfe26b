//! Stylesheet templating.
//!
//! Rendering goes through the [`TemplateEngine`] trait so engines can be
//! swapped by name. Built-in templates for CSS, SCSS, Sass and Less are
//! embedded in the binary; any other `path` is read from disk.

mod mustache;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::IconConfig;
use crate::error::{IconError, Result};
use crate::types::GlyphEntry;

pub use mustache::{MustacheEngine, MUSTACHE};

/// Renders a template against a JSON context.
pub trait TemplateEngine: Send + Sync {
    /// Identifier used in the `engine` option.
    fn name(&self) -> &str;

    /// Render `template` with `context`.
    fn render(&self, template: &str, context: &Value) -> Result<String>;
}

/// Registry of template engines by name.
#[derive(Clone)]
pub struct Engines {
    engines: BTreeMap<String, Arc<dyn TemplateEngine>>,
}

impl Engines {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            engines: BTreeMap::new(),
        }
    }

    /// A registry holding the built-in engines.
    pub fn builtin() -> Self {
        let mut engines = Self::empty();
        engines.register(MustacheEngine);
        engines
    }

    /// Add an engine, replacing any engine of the same name.
    pub fn register(&mut self, engine: impl TemplateEngine + 'static) {
        self.engines
            .insert(engine.name().to_string(), Arc::new(engine));
    }

    /// Look up an engine by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn TemplateEngine>> {
        self.engines.get(name).cloned().ok_or_else(|| IconError::Config {
            message: format!("Missing template engine \"{}\"", name),
            help: Some(format!("Available engines: {}", self.names().join(", "))),
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.engines.keys().map(String::as_str).collect()
    }
}

impl Default for Engines {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for Engines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.engines.keys()).finish()
    }
}

/// Stylesheet templates shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTemplate {
    Css,
    Scss,
    Sass,
    Less,
}

impl BuiltinTemplate {
    pub const ALL: [BuiltinTemplate; 4] = [Self::Css, Self::Scss, Self::Sass, Self::Less];

    /// Match a selector case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Scss => "scss",
            Self::Sass => "sass",
            Self::Less => "less",
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            Self::Css => include_str!("../../templates/_icons.css"),
            Self::Scss => include_str!("../../templates/_icons.scss"),
            Self::Sass => include_str!("../../templates/_icons.sass"),
            Self::Less => include_str!("../../templates/_icons.less"),
        }
    }
}

/// Where the stylesheet template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Builtin(BuiltinTemplate),
    File(PathBuf),
}

impl TemplateSource {
    /// Resolve the `path` option. Empty selects SCSS.
    pub fn from_selector(selector: &str) -> Self {
        if selector.is_empty() {
            return Self::Builtin(BuiltinTemplate::Scss);
        }
        match BuiltinTemplate::from_name(selector) {
            Some(builtin) => Self::Builtin(builtin),
            None => Self::File(PathBuf::from(selector)),
        }
    }

    /// Read the template text.
    pub fn load(&self) -> Result<Cow<'static, str>> {
        match self {
            Self::Builtin(builtin) => Ok(Cow::Borrowed(builtin.source())),
            Self::File(path) => std::fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|e| IconError::Config {
                    message: format!("Cannot read template {}: {}", path.display(), e),
                    help: Some("Use css, scss, sass, less or a path to a template".to_string()),
                }),
        }
    }
}

/// Values available to stylesheet templates.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StylesheetContext<'a> {
    pub glyphs: &'a [GlyphEntry],
    pub font_name: &'a str,
    pub font_path: &'a str,
    pub css_class: &'a str,
    pub cache_buster: &'a str,
    pub cache_buster_query_string: String,
}

impl<'a> StylesheetContext<'a> {
    pub fn new(config: &'a IconConfig, glyphs: &'a [GlyphEntry]) -> Self {
        Self {
            glyphs,
            font_name: config.font_name().unwrap_or_default(),
            font_path: &config.font_path,
            css_class: &config.css_class,
            cache_buster: &config.cache_buster,
            cache_buster_query_string: config.cache_buster_query_string(),
        }
    }
}

/// A resolved engine and template, ready to render once input ends.
pub struct StylesheetEmitter {
    engine: Arc<dyn TemplateEngine>,
    template: Cow<'static, str>,
}

impl StylesheetEmitter {
    /// Resolve the engine and read the template named by the config.
    pub fn from_config(config: &IconConfig, engines: &Engines) -> Result<Self> {
        let engine = engines.get(&config.engine)?;
        let template = TemplateSource::from_selector(&config.path).load()?;
        Ok(Self { engine, template })
    }

    /// Render the stylesheet for `glyphs`.
    pub fn render(&self, config: &IconConfig, glyphs: &[GlyphEntry]) -> Result<String> {
        let context = serde_json::to_value(StylesheetContext::new(config, glyphs)).map_err(|e| {
            IconError::Render {
                message: format!("Failed to build template context: {}", e),
                help: None,
            }
        })?;
        self.engine.render(&self.template, &context)
    }
}

impl fmt::Debug for StylesheetEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StylesheetEmitter")
            .field("engine", &self.engine.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CodePoint;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn glyphs() -> Vec<GlyphEntry> {
        let home = GlyphEntry::new("home", CodePoint::new(0xE001));
        vec![
            home.clone(),
            GlyphEntry::new("user", CodePoint::new(0xE002)),
            GlyphEntry::alias("house", &home),
        ]
    }

    #[test]
    fn test_selector_resolution() {
        assert_eq!(
            TemplateSource::from_selector(""),
            TemplateSource::Builtin(BuiltinTemplate::Scss)
        );
        assert_eq!(
            TemplateSource::from_selector("LESS"),
            TemplateSource::Builtin(BuiltinTemplate::Less)
        );
        assert_eq!(
            TemplateSource::from_selector("sass"),
            TemplateSource::Builtin(BuiltinTemplate::Sass)
        );
        assert_eq!(
            TemplateSource::from_selector("templates/icons.css"),
            TemplateSource::File(PathBuf::from("templates/icons.css"))
        );
    }

    #[test]
    fn test_unknown_engine_is_config_error() {
        let mut config = IconConfig::new("Icons");
        config.engine = "lodash".to_string();

        let err = StylesheetEmitter::from_config(&config, &Engines::builtin()).unwrap_err();
        assert!(matches!(err, IconError::Config { .. }));
        assert!(err.to_string().contains("lodash"));
    }

    #[test]
    fn test_missing_template_file_is_config_error() {
        let mut config = IconConfig::new("Icons");
        config.path = "/nonexistent/_icons.tpl".to_string();

        assert!(matches!(
            StylesheetEmitter::from_config(&config, &Engines::builtin()),
            Err(IconError::Config { .. })
        ));
    }

    #[test]
    fn test_css_template_renders_glyph_rules() {
        let config = IconConfig::new("Icons");
        let emitter = StylesheetEmitter::from_config(&config, &Engines::builtin()).unwrap();
        let css = emitter.render(&config, &glyphs()).unwrap();

        assert!(css.contains("font-family: \"Icons\";"));
        assert!(css.contains("url('./Icons.woff2')"));
        assert!(css.contains(".icon-home:before {\n\tcontent: \"\\E001\";\n}"));
        assert!(css.contains(".icon-user:before {\n\tcontent: \"\\E002\";\n}"));
        assert!(css.contains(".icon-house:before {\n\tcontent: \"\\E001\";\n}"));
        assert!(!css.contains("{{"));
    }

    #[test]
    fn test_cache_buster_in_urls() {
        let mut config = IconConfig::new("Icons");
        config.cache_buster = "v2".to_string();
        let emitter = StylesheetEmitter::from_config(&config, &Engines::builtin()).unwrap();
        let css = emitter.render(&config, &glyphs()).unwrap();

        assert!(css.contains("url('./Icons.woff?v2')"));
        assert!(css.contains("url('./Icons.eot?v2#iefix')"));
    }

    #[test]
    fn test_preprocessor_templates_extend_original_for_aliases() {
        for (selector, alias_line) in [
            ("scss", "@include icon(home);"),
            ("sass", "+icon(home)"),
            ("less", ".icon(home);"),
        ] {
            let mut config = IconConfig::new("Icons");
            config.path = selector.to_string();
            let emitter = StylesheetEmitter::from_config(&config, &Engines::builtin()).unwrap();
            let out = emitter.render(&config, &glyphs()).unwrap();

            let house = out
                .split(".icon-house")
                .nth(1)
                .unwrap_or_else(|| panic!("{} output has no alias rule", selector));
            assert!(house.contains(alias_line), "{}: {}", selector, house);
            assert!(out.contains("E002"), "{}", selector);
        }
    }

    #[test]
    fn test_custom_template_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("icons.tpl");
        std::fs::write(
            &path,
            "{{#glyphs}}{{fileName}}:{{codePoint}}{{#originalFileName}}>{{.}}{{/originalFileName}}\n{{/glyphs}}",
        )
        .unwrap();

        let mut config = IconConfig::new("Icons");
        config.path = path.display().to_string();
        let emitter = StylesheetEmitter::from_config(&config, &Engines::builtin()).unwrap();

        assert_eq!(
            emitter.render(&config, &glyphs()).unwrap(),
            "home:E001\nuser:E002\nhouse:E001>home\n"
        );
    }

    #[test]
    fn test_registered_engine_is_used() {
        struct Upper;
        impl TemplateEngine for Upper {
            fn name(&self) -> &str {
                "upper"
            }
            fn render(&self, template: &str, _context: &Value) -> Result<String> {
                Ok(template.to_uppercase())
            }
        }

        let mut engines = Engines::builtin();
        engines.register(Upper);
        assert_eq!(engines.names(), vec!["mustache", "upper"]);

        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        std::fs::write(&path, "icons").unwrap();

        let mut config = IconConfig::new("Icons");
        config.engine = "upper".to_string();
        config.path = path.display().to_string();
        let emitter = StylesheetEmitter::from_config(&config, &engines).unwrap();

        assert_eq!(emitter.render(&config, &[]).unwrap(), "ICONS");
    }
}
