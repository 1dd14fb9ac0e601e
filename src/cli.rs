use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "winsetup")]
#[command(version)]
#[command(about = "Windows post-install automation - debloat, fonts and apps from one JSON config", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the JSON configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the configured provisioning phases
    Apply(ApplyArgs),

    /// Show the current install state of everything configured
    Status,

    /// Check provider tooling, elevation and updates
    Doctor,

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Only run the named phases (comma-separated: debloat, fonts,
    /// apps, cleanup)
    #[arg(short, long, value_delimiter = ',')]
    pub phase: Vec<String>,

    /// Show what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration
    Show,

    /// Validate the configuration file
    Validate,

    /// Print the config file location
    Path,
}
