//! CLI module for the alert receiver
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the webhook receiver and worker pool
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start with the default config path
//! alert-receiver serve
//!
//! # Write a starter config
//! alert-receiver config init -o alert-receiver.toml
//!
//! # Generate shell completions
//! alert-receiver completions bash > ~/.bash_completion.d/alert-receiver
//! ```

pub mod completions;
pub mod config;
pub mod serve;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Alert receiver - LLM-assisted root-cause analysis for alert webhooks
#[derive(Parser, Debug)]
#[command(
    name = "alert-receiver",
    version,
    about = "Enriches alert webhooks with Prometheus evidence and fans them out to LLM backends"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the receiver
    Serve(ServeArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "alert-receiver.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Override worker count
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Disable Prometheus enrichment
    #[arg(long)]
    pub no_evidence: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "alert-receiver.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
