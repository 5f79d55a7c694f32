//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// envgraph - compile development environments into build graphs
///
/// Reads an environment file and produces a layered, content-addressed
/// build definition.
#[derive(Parser, Debug)]
#[command(name = "envgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ENVGRAPH_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile an environment file into a build definition
    Compile(CompileArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the compile command
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Environment file (TOML)
    pub file: PathBuf,

    /// Write the definition here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target platform (overrides build.platform)
    #[arg(long)]
    pub platform: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}
