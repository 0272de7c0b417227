//! # CLI Argument Definitions
//!
//! Command-line structure of the `sreg` binary, defined with `clap`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "sreg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Inspect and deliver scripts from a script registry")]
pub(crate) struct Cli {
    /// Configuration file (defaults to an optional `sreg.*` in the working directory)
    #[arg(short, long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Disable merging, regardless of the configuration
    #[arg(short, long, global = true)]
    pub(crate) debug: bool,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// List registered declarations in delivery order
    List {},
    /// Show delivery groups and the scripts each one delivers
    Groups {},
    /// Show the groups visible in a context, last group first
    Ordered {
        /// JSON object used as the render context
        #[arg(long)]
        context: Option<PathBuf>,
    },
    /// Print the resolved text of a script or group
    Render {
        id: String,
        /// JSON object used as the render context
        #[arg(long)]
        context: Option<PathBuf>,
    },
    /// Print a delivery with its headers
    Deliver {
        id: String,
        /// JSON object used as the render context
        #[arg(long)]
        context: Option<PathBuf>,
    },
}
