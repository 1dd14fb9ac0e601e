mod bootstrap;
mod cli;
mod commands;
mod config;
mod elevation;
mod host;
mod manifest;
mod progress;
mod runner;
mod schema;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, ConfigCommand};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config.clone(),
    };

    match cli.command {
        Command::Apply(args) => commands::apply::run(&ctx, args),
        Command::Status => commands::status::run(&ctx),
        Command::Doctor => commands::doctor::run(&ctx),
        Command::Config(cmd) => match cmd {
            ConfigCommand::Show => commands::config::show(&ctx),
            ConfigCommand::Validate => commands::config::validate(&ctx),
            ConfigCommand::Path => commands::config::path(&ctx),
        },
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "winsetup", &mut io::stdout());
            Ok(())
        }
    }
}
