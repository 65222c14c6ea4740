use clap::Parser;
use miette::Result;
use navgrid::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => navgrid::cli::convert::run(args)?,
        Commands::Render(args) => navgrid::cli::render::run(args)?,
        Commands::Scan(args) => navgrid::cli::scan::run(args)?,
        Commands::Completions(args) => navgrid::cli::completions::run(args)?,
    }

    Ok(())
}
