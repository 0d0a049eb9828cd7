use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tokensmith",
    about = "tokensmith: normalize design-token exports into primitive/semantic stylesheets",
    version
)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline over a directory of token exports
    Build {
        /// Directory holding the `.json` exports
        input: String,

        /// Path to the TOML configuration
        #[arg(long, default_value = "tokensmith.toml")]
        config: String,

        /// Output directory for mappings, stylesheets and the report
        #[arg(long, default_value = "tokens-dist")]
        out: String,

        /// Override `colors.match_threshold`
        #[arg(long)]
        threshold: Option<f64>,

        /// Override `resolution.max_depth`
        #[arg(long)]
        max_depth: Option<usize>,

        /// Print the JSON report instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Detect the export shape of one file
    Detect {
        /// Path to a `.json` export
        file: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify token names as primitive or semantic
    Classify {
        /// Token names (kebab-cased before classification)
        #[arg(required = true)]
        names: Vec<String>,

        /// Path to the TOML configuration
        #[arg(long, default_value = "tokensmith.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
