//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Scaffold and serve Elm emaki (slide) projects
#[derive(Parser, Debug)]
#[command(name = "elm-emaki")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize emaki at ./emaki
    Init {
        /// Emaki root directory (default: ./emaki)
        #[arg(long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
        /// Overwrite existing files without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Build and serve emaki at ./emaki
    Serve {
        /// Emaki root directory (default: ./emaki)
        #[arg(long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
        /// Port number (default: $EMAKI_PORT or 8000)
        #[arg(short, long, value_parser = clap::value_parser!(u16))]
        port: Option<u16>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective config
    Show,

    /// Show config path
    Path,

    /// Create config template
    Init {
        /// Overwrite an existing config without asking
        #[arg(short, long)]
        yes: bool,
    },
}
