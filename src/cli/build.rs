//! Build command implementation.
//!
//! Assigns codepoints to SVG icons, writes each icon renamed to
//! `u<HEX>-<name>.svg` under the output directory, and writes the generated
//! stylesheet next to them.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::{IconConfig, CONFIG_FILENAME};
use crate::discovery::scan_inputs;
use crate::error::{IconError, Result};
use crate::output::{display_path, plural, Printer};
use crate::stream::IconStream;
use crate::template::Engines;
use crate::types::{CodePoint, FileItem};

/// Assign codepoints, rename icons and generate the stylesheet
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// SVG files or directories to process
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Config file (default: iconcss.yaml in the current directory, if present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Output directory
    #[arg(long, short, default_value = "dist")]
    pub output: PathBuf,

    /// Font family name
    #[arg(long)]
    pub font_name: Option<String>,

    /// Stylesheet file name, relative to the output directory
    #[arg(long)]
    pub target_path: Option<PathBuf>,

    /// Template: css, scss, sass, less or a template file
    #[arg(long)]
    pub template: Option<String>,

    /// Font URL prefix used in the stylesheet
    #[arg(long)]
    pub font_path: Option<String>,

    /// Class prefix used in the stylesheet
    #[arg(long)]
    pub css_class: Option<String>,

    /// First codepoint to assign, in hex (e.g. E001)
    #[arg(long)]
    pub first_glyph: Option<CodePoint>,

    /// Cache-busting token appended to font URLs
    #[arg(long)]
    pub cache_buster: Option<String>,

    /// Glyph map file that keeps codepoints stable between builds
    #[arg(long)]
    pub glyph_map: Option<PathBuf>,
}

pub fn run(args: BuildArgs, printer: &Printer) -> Result<()> {
    let config = load_config(&args)?;

    let mut stream = IconStream::new(config, &Engines::builtin())?;
    if let Some(map) = stream.config().glyph_map_path() {
        printer.info("Loaded", &format!("glyph map {}", display_path(map)));
    }

    for input in &args.inputs {
        printer.status("Scanning", &display_path(input));
    }

    for item in scan_inputs(&args.inputs) {
        let item = item?;
        if item.is_null() {
            stream.process(item)?;
            continue;
        }

        let source = item.relative().to_path_buf();
        let renamed = stream.process(item)?;
        printer.status(
            "Assigning",
            &format!(
                "{} {} {}",
                source.display(),
                printer.dim("->"),
                renamed.relative().display()
            ),
        );
        write_item(renamed, &args.output)?;
    }

    let summary = stream.summary();
    let map_path = stream.config().glyph_map_path().map(Path::to_path_buf);

    match stream.finish()? {
        Some(stylesheet) => {
            let path = write_item(stylesheet, &args.output)?;
            printer.status("Writing", &display_path(&path));
            if let Some(map) = map_path {
                printer.success("Saved", &display_path(&map));
            }
        }
        None => printer.warning("Skipping", "no icons found, stylesheet not generated"),
    }

    printer.success(
        "Finished",
        &format!(
            "{} ({} new, {} reused, {} fixed, {})",
            plural(summary.icons, "icon", "icons"),
            summary.minted,
            summary.reused,
            summary.fixed,
            plural(summary.aliases, "alias", "aliases"),
        ),
    );

    Ok(())
}

/// Build the config from the config file, then apply command-line overrides.
fn load_config(args: &BuildArgs) -> Result<IconConfig> {
    let mut config = match &args.config {
        Some(path) => IconConfig::load(path)?,
        None if Path::new(CONFIG_FILENAME).exists() => IconConfig::load(Path::new(CONFIG_FILENAME))?,
        None => IconConfig::default(),
    };

    if let Some(font_name) = &args.font_name {
        config.font_name = Some(font_name.clone());
    }
    if let Some(target_path) = &args.target_path {
        config.target_path = target_path.clone();
    }
    if let Some(template) = &args.template {
        config.path = template.clone();
    }
    if let Some(font_path) = &args.font_path {
        config.font_path = font_path.clone();
    }
    if let Some(css_class) = &args.css_class {
        config.css_class = css_class.clone();
    }
    if let Some(first_glyph) = args.first_glyph {
        config.first_glyph = first_glyph;
    }
    if let Some(cache_buster) = &args.cache_buster {
        config.cache_buster = cache_buster.clone();
    }
    if let Some(glyph_map) = &args.glyph_map {
        config.glyph_map_file_path = glyph_map.display().to_string();
    }

    Ok(config)
}

/// Write an item under `output`, keeping its path relative to its base.
fn write_item(item: FileItem, output: &Path) -> Result<PathBuf> {
    let path = output.join(item.relative());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| IconError::Io {
            path: parent.to_path_buf(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }

    let bytes = item.contents.into_bytes().map_err(|e| IconError::Io {
        path: item.path.clone(),
        message: format!("Failed to read contents: {}", e),
    })?;
    fs::write(&path, bytes).map_err(|e| IconError::Io {
        path: path.clone(),
        message: format!("Failed to write file: {}", e),
    })?;

    Ok(path)
}
