use clap::Parser;
use iconcss::cli::{Cli, Commands};
use iconcss::output::Printer;
use miette::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Build(args) => iconcss::cli::build::run(args, &printer)?,
        Commands::Init(args) => iconcss::cli::init::run(args, &printer)?,
        Commands::Map(args) => iconcss::cli::map::run(args, &printer)?,
        Commands::Completions(args) => iconcss::cli::completions::run(args)?,
    }

    Ok(())
}
