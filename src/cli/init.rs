//! Init command implementation.
//!
//! Writes a starter `iconcss.yaml` listing every supported option with its
//! default value.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::config::{IconConfig, CONFIG_FILENAME};
use crate::discovery::scan_inputs;
use crate::error::{IconError, Result};
use crate::output::{display_path, plural, Printer};

/// Initialize an iconcss project by generating iconcss.yaml
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Font family name written to the config
    #[arg(long, default_value = "Icons")]
    pub font_name: String,

    /// Overwrite existing iconcss.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let config_path = args.path.join(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        return Err(IconError::Config {
            message: format!("{} already exists", CONFIG_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    printer.status("Scanning", &display_path(&args.path));
    let icons = scan_inputs(std::slice::from_ref(&args.path))
        .filter_map(|item| item.ok())
        .filter(|item| !item.is_null())
        .count();

    let yaml = starter_config(&args.font_name);
    fs::write(&config_path, yaml).map_err(|e| IconError::Io {
        path: config_path.clone(),
        message: format!("Failed to write config: {}", e),
    })?;

    printer.success(
        "Created",
        &format!(
            "{} ({} found)",
            CONFIG_FILENAME,
            plural(icons, "icon", "icons")
        ),
    );

    Ok(())
}

/// Render the starter config. Built by hand to keep comments and ordering.
fn starter_config(font_name: &str) -> String {
    let defaults = IconConfig::default();
    let mut yaml = String::new();

    yaml.push_str(&format!("fontName: {}\n", font_name));
    yaml.push_str("# css, scss, sass, less or a path to a template\n");
    yaml.push_str(&format!("path: {}\n", defaults.path));
    yaml.push_str(&format!("targetPath: {}\n", defaults.target_path.display()));
    yaml.push_str(&format!("fontPath: {}\n", defaults.font_path));
    yaml.push_str(&format!("cssClass: {}\n", defaults.css_class));
    yaml.push_str(&format!("firstGlyph: \"{}\"\n", defaults.first_glyph));
    yaml.push_str("fixedCodepoints: false\n");
    yaml.push_str("aliases: {}\n");
    yaml.push_str("cacheBuster: \"\"\n");
    yaml.push_str("# Keep codepoints stable between builds\n");
    yaml.push_str("glyphMapFilePath: glyphs.json\n");

    yaml
}
