//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::compose::Mode;

/// Prompt Copilot - offline prompt-template browser
#[derive(Parser)]
#[command(
    name = "pc",
    about = "Browse prompt templates, fill in variables, copy the result",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Catalog file (overrides config)
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Subcommand to execute (defaults to `browse`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive browser
    Browse,

    /// List category names
    Categories,

    /// List the tasks of a category
    Tasks {
        /// Category name
        category: String,
    },

    /// Show a task's description, template and variables
    Show {
        /// Category name
        category: String,

        /// Task name
        task: String,
    },

    /// Print the composed prompt for a task
    Compose {
        /// Category name
        category: String,

        /// Task name
        task: String,

        /// Output mode (defaults to the configured mode)
        #[arg(short, long, value_enum)]
        mode: Option<Mode>,

        /// Variable value as NAME=VALUE; multi values are comma-separated or given by repeating NAME
        #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },

    /// List output modes
    Modes,

    /// Check the working directory and the catalog file
    Doctor {
        /// Directory to inspect (defaults to the current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// File name to look for (defaults to the catalog file name)
        #[arg(short, long)]
        file: Option<String>,
    },
}

/// Parse `NAME=VALUE`; the value may itself contain `=`
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

/// Log file location
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptcopilot")
        .join("logs")
        .join("promptcopilot.log")
}
