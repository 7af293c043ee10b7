use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the buzz binary.
#[derive(Parser, Debug)]
#[command(name = "buzz", version, about = "buzz compiler front end")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a script and report diagnostics.
    Check {
        /// Script to parse.
        file: PathBuf,

        /// Search path for imports and native libraries (overrides BUZZ_PATH).
        #[arg(long = "buzz-path")]
        buzz_path: Option<PathBuf>,
    },

    /// Parse a script and print its AST as JSON.
    Ast {
        /// Script to parse.
        file: PathBuf,

        /// Search path for imports and native libraries (overrides BUZZ_PATH).
        #[arg(long = "buzz-path")]
        buzz_path: Option<PathBuf>,
    },
}
