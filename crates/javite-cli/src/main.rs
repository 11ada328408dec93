#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use javite_core::config::{BUILD_MODE, DEV_MODE};
use javite_core::host::Command;
use javite_core::Config;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "javite")]
#[command(author, version, about = "Vite integration for Java backends", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted logs
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Project config file (defaults to javite.config.json, then javite.config.js)
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Start the development server and publish its URL in the hot file
    Dev {
        /// Mode used to pick `.env.[mode]` files
        #[arg(long, default_value = DEV_MODE)]
        mode: String,
    },

    /// Print the resolved bundler configuration as JSON
    Config {
        /// Command to resolve the configuration for
        #[arg(long, value_enum, default_value_t = CommandArg::Build)]
        command: CommandArg,

        /// Mode used to pick `.env.[mode]` files (defaults per command)
        #[arg(long)]
        mode: Option<String>,
    },

    /// Print the entry points matched by glob patterns as JSON
    Inputs {
        /// Glob patterns, relative to the working directory
        patterns: Vec<String>,

        /// Directory stripped from entry aliases
        #[arg(long, default_value = javite_core::project::DEFAULT_INPUT_BASE)]
        base: String,
    },

    /// Print the merged contents of `.properties` files as JSON
    Properties {
        /// Glob patterns, relative to the working directory
        patterns: Vec<String>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum CommandArg {
    Build,
    Serve,
}

impl From<CommandArg> for Command {
    fn from(arg: CommandArg) -> Self {
        match arg {
            CommandArg::Build => Command::Build,
            CommandArg::Serve => Command::Serve,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json)
        .with_config_file(cli.config);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        None | Some(Commands::Version) => commands::version::run(&config),
        Some(Commands::Dev { mode }) => {
            let rt = tokio::runtime::Runtime::new().into_diagnostic()?;
            rt.block_on(commands::dev::run(commands::dev::DevAction { config, mode }))
        }
        Some(Commands::Config { command, mode }) => {
            let command = Command::from(command);
            let mode = mode.unwrap_or_else(|| match command {
                Command::Build => BUILD_MODE.to_string(),
                Command::Serve => DEV_MODE.to_string(),
            });
            commands::config::run(&config, command, &mode)
        }
        Some(Commands::Inputs { patterns, base }) => {
            commands::inputs::run(&config, &patterns, &base)
        }
        Some(Commands::Properties { patterns }) => commands::properties::run(&config, &patterns),
    }
}
