pub mod build;
pub mod completions;
pub mod init;
pub mod map;

use clap::{Parser, Subcommand};

/// iconcss - Icon font codepoints and stylesheets
#[derive(Parser, Debug)]
#[command(name = "iconcss")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign codepoints, rename icons and generate the stylesheet
    Build(build::BuildArgs),

    /// Initialize an iconcss project (generates iconcss.yaml)
    Init(init::InitArgs),

    /// Show the contents of a saved glyph map
    Map(map::MapArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
