//! Command-line parsing for the catalog mirror.
//!
//! Configuration comes from the environment (see `config`); flags here only
//! choose what to run and where output goes.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mirror", version, about = "Mirror CMS course listings into embeddable HTML")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the catalog and diagnostic endpoints over HTTP.
    Serve(ServeArgs),
    /// Render the catalog once and print or save it.
    Render(RenderArgs),
    /// Report credential presence and API reachability as JSON.
    Diag,
    /// Print the course collection's field schema as JSON.
    Schema,
}

#[derive(Debug, Parser, Clone, Default)]
pub struct ServeArgs {
    /// Address to listen on (defaults to BIND_ADDR, then 0.0.0.0:3000).
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct RenderArgs {
    /// Render a standalone page with embedded styling instead of a fragment.
    #[arg(long)]
    pub preview: bool,

    /// Write the HTML to a file instead of stdout.
    #[arg(long, value_name = "HTML")]
    pub out: Option<PathBuf>,
}
