//! Map command implementation.
//!
//! Prints a saved glyph map as a table, in the order it is stored.

use std::path::PathBuf;

use clap::Args;

use crate::error::{IconError, Result};
use crate::output::{plural, Printer};
use crate::store::GlyphMapStore;
use crate::types::GlyphEntry;

/// Show the contents of a saved glyph map
#[derive(Args, Debug)]
pub struct MapArgs {
    /// Glyph map file
    pub glyph_map: PathBuf,

    /// Print the map as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: MapArgs, printer: &Printer) -> Result<()> {
    if !args.glyph_map.exists() {
        return Err(IconError::Io {
            path: args.glyph_map.clone(),
            message: "Glyph map not found".to_string(),
        });
    }

    let glyphs = GlyphMapStore::new(&args.glyph_map).load()?;

    if args.json {
        let json = serde_json::to_string_pretty(&glyphs).map_err(|e| IconError::Parse {
            message: format!("Failed to serialize glyph map: {}", e),
            help: None,
        })?;
        println!("{}", json);
        return Ok(());
    }

    for line in format_table(&glyphs) {
        println!("{}", line);
    }

    let aliases = glyphs.iter().filter(|g| g.is_alias()).count();
    printer.info(
        "Glyphs",
        &format!(
            "{}, {}",
            plural(glyphs.len() - aliases, "icon", "icons"),
            plural(aliases, "alias", "aliases")
        ),
    );

    Ok(())
}

/// One line per glyph: codepoint, name and, for aliases, the original name.
fn format_table(glyphs: &[GlyphEntry]) -> Vec<String> {
    let width = glyphs
        .iter()
        .map(|g| g.file_name.len())
        .max()
        .unwrap_or(0);

    glyphs
        .iter()
        .map(|g| match &g.original_file_name {
            Some(original) => format!(
                "{:<6} {:<width$}  -> {}",
                g.code_point.to_string(),
                g.file_name,
                original
            ),
            None => format!("{:<6} {}", g.code_point.to_string(), g.file_name),
        })
        .collect()
}
