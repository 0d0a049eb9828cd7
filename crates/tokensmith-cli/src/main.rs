//! tokensmith CLI: the `tokensmith` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            input,
            config,
            out,
            threshold,
            max_depth,
            json,
        } => commands::build::run(commands::build::Args {
            input,
            config,
            out,
            threshold,
            max_depth,
            json,
        }),

        Commands::Detect { file, json } => commands::detect::run(file, json),

        Commands::Classify {
            names,
            config,
            json,
        } => commands::classify::run(names, config, json),
    }
}
