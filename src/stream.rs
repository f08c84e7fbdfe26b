//! Per-item codepoint assignment and end-of-input finalisation.
//!
//! [`IconStream`] is created once per run. Creating it validates the config,
//! resolves the template and loads the glyph map, so every failure that can
//! happen up front does so before the first item is accepted. Each call to
//! [`IconStream::process`] renames one item; [`IconStream::finish`] renders
//! the stylesheet and saves the glyph map exactly once.
//!
//! ```ignore
//! let stream = IconStream::new(IconConfig::new("Icons"), &Engines::builtin())?;
//! for item in stream.transform(items) {
//!     let item = item?; // renamed icons, then the stylesheet
//! }
//! ```

use std::io::Cursor;
use std::path::PathBuf;

use crate::allocator::{Assignment, CodepointAllocator};
use crate::config::IconConfig;
use crate::error::{IconError, Result};
use crate::store::{sorted_for_persist, GlyphMapStore};
use crate::template::{Engines, StylesheetEmitter};
use crate::types::{Contents, FileItem, GlyphEntry};

/// Counts gathered during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items renamed.
    pub icons: usize,
    /// Null items passed through untouched.
    pub passed: usize,
    /// Glyph entries recorded, aliases included.
    pub glyphs: usize,
    pub aliases: usize,
    /// Codepoints minted from a counter.
    pub minted: usize,
    /// Codepoints reused from the glyph map.
    pub reused: usize,
    /// Codepoints taken from `fixedCodepoints`.
    pub fixed: usize,
}

/// Where the stylesheet item will go, captured from the first icon.
#[derive(Debug)]
struct OutputSite {
    base: PathBuf,
    cwd: PathBuf,
    streamed: bool,
}

/// Assigns codepoints to icon items and emits the stylesheet at the end.
#[derive(Debug)]
pub struct IconStream {
    config: IconConfig,
    allocator: CodepointAllocator,
    emitter: StylesheetEmitter,
    store: Option<GlyphMapStore>,
    glyphs: Vec<GlyphEntry>,
    site: Option<OutputSite>,
    summary: RunSummary,
}

impl IconStream {
    /// Validate the config and load everything needed before item one.
    pub fn new(config: IconConfig, engines: &Engines) -> Result<Self> {
        config.validate()?;
        let emitter = StylesheetEmitter::from_config(&config, engines)?;

        let store = config.glyph_map_path().map(GlyphMapStore::new);
        let saved = store.as_ref().map(GlyphMapStore::load).transpose()?;
        let allocator = CodepointAllocator::from_config(&config, saved.as_deref());

        Ok(Self {
            config,
            allocator,
            emitter,
            store,
            glyphs: Vec::new(),
            site: None,
            summary: RunSummary::default(),
        })
    }

    pub fn config(&self) -> &IconConfig {
        &self.config
    }

    pub fn allocator(&self) -> &CodepointAllocator {
        &self.allocator
    }

    /// Glyphs recorded so far, in arrival order.
    pub fn glyphs(&self) -> &[GlyphEntry] {
        &self.glyphs
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Assign a codepoint to one item and rename it `u<HEX>-<name>`.
    ///
    /// Null items pass through unchanged.
    pub fn process(&mut self, mut item: FileItem) -> Result<FileItem> {
        if item.is_null() {
            self.summary.passed += 1;
            return Ok(item);
        }

        if self.site.is_none() {
            self.site = Some(OutputSite {
                base: item.base.clone(),
                cwd: item.cwd.clone(),
                streamed: item.is_stream(),
            });
        }

        let file_name = item.icon_name();
        self.check_names(&file_name)?;
        let (code_point, assignment) = self.allocator.allocate(&file_name)?;

        match assignment {
            Assignment::Minted => self.summary.minted += 1,
            Assignment::Persisted => self.summary.reused += 1,
            Assignment::Fixed => self.summary.fixed += 1,
            Assignment::Repeated => {}
        }

        if assignment != Assignment::Repeated {
            let glyph = GlyphEntry::new(file_name, code_point);
            let aliases: Vec<GlyphEntry> = self
                .config
                .aliases_for(&glyph.file_name)
                .iter()
                .map(|alias| GlyphEntry::alias(alias.as_str(), &glyph))
                .collect();
            self.summary.aliases += aliases.len();
            self.glyphs.push(glyph);
            self.glyphs.extend(aliases);
            self.summary.glyphs = self.glyphs.len();
        }

        item.prefix_basename(&format!("u{}-", code_point));
        self.summary.icons += 1;
        Ok(item)
    }

    /// Fail if a new icon or any of its aliases reuses a name already
    /// recorded in this run. Each name maps to exactly one glyph entry.
    fn check_names(&self, file_name: &str) -> Result<()> {
        if self.allocator.assigned(file_name).is_some() {
            return Ok(());
        }

        if let Some(alias) = self.glyphs.iter().find(|g| g.file_name == file_name) {
            let original = alias.original_file_name.as_deref().unwrap_or_default();
            return Err(alias_clash(file_name, original, "an icon of the same name"));
        }

        let aliases = self.config.aliases_for(file_name);
        for (i, alias) in aliases.iter().enumerate() {
            if alias == file_name {
                return Err(alias_clash(alias, file_name, "the icon itself"));
            }
            if aliases[..i].contains(alias) {
                return Err(alias_clash(alias, file_name, "the same alias listed twice"));
            }
            if let Some(existing) = self.glyphs.iter().find(|g| &g.file_name == alias) {
                let owner = match &existing.original_file_name {
                    Some(original) => format!("an alias of \"{}\"", original),
                    None => "an icon of the same name".to_string(),
                };
                return Err(alias_clash(alias, file_name, &owner));
            }
        }

        Ok(())
    }

    /// Render the stylesheet and save the glyph map.
    ///
    /// Returns `None` without touching the glyph map when no glyphs were
    /// recorded. The map is only written after rendering succeeds.
    pub fn finish(self) -> Result<Option<FileItem>> {
        let Some(site) = self.site else {
            return Ok(None);
        };
        if self.glyphs.is_empty() {
            return Ok(None);
        }

        let glyphs = match &self.store {
            Some(_) => sorted_for_persist(&self.glyphs),
            None => self.glyphs,
        };

        let stylesheet = self.emitter.render(&self.config, &glyphs)?;

        if let Some(store) = &self.store {
            store.save(&glyphs)?;
        }

        let bytes = stylesheet.into_bytes();
        let contents = if site.streamed {
            Contents::Stream(Box::new(Cursor::new(bytes)))
        } else {
            Contents::Buffer(bytes)
        };

        Ok(Some(FileItem::new(
            site.base.join(&self.config.target_path),
            site.base,
            site.cwd,
            contents,
        )))
    }

    /// Wrap an upstream sequence: yields each processed item, then the
    /// stylesheet. Stops at the first error without saving anything.
    pub fn transform<I>(self, upstream: I) -> Transform<I::IntoIter>
    where
        I: IntoIterator<Item = Result<FileItem>>,
    {
        Transform {
            upstream: upstream.into_iter(),
            stream: Some(self),
        }
    }
}

fn alias_clash(alias: &str, original: &str, clash: &str) -> IconError {
    IconError::config(
        format!("Alias \"{}\" of \"{}\" clashes with {}", alias, original, clash),
        Some("Alias names must differ from icon names and from each other"),
    )
}

/// Iterator returned by [`IconStream::transform`].
pub struct Transform<I> {
    upstream: I,
    stream: Option<IconStream>,
}

impl<I> Iterator for Transform<I>
where
    I: Iterator<Item = Result<FileItem>>,
{
    type Item = Result<FileItem>;

    fn next(&mut self) -> Option<Self::Item> {
        let stream = self.stream.as_mut()?;
        match self.upstream.next() {
            Some(Ok(item)) => {
                let processed = stream.process(item);
                if processed.is_err() {
                    self.stream = None;
                }
                Some(processed)
            }
            Some(Err(e)) => {
                self.stream = None;
                Some(Err(e))
            }
            None => self.stream.take()?.finish().transpose(),
        }
    }
}
