//! CLI definitions for GramaSathi.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// GramaSathi CLI.
#[derive(Parser)]
#[command(name = "gramasathi")]
#[command(about = "Civic-complaint form automation service")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the HTTP API in foreground (default)
    Run {
        /// Server host, overrides `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Server port, overrides `server.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single form task and print its report
    Task {
        /// Stored user whose record fills the form
        #[arg(long)]
        user_id: String,

        /// Task title
        #[arg(long)]
        title: String,

        /// Form URL or local HTML path
        #[arg(long)]
        form: String,

        /// Field locators as a JSON object, e.g. '{"name":"#fullName"}'
        #[arg(long)]
        selectors: Option<String>,
    },

    /// Insert a sample user, task and message
    Seed,
}
