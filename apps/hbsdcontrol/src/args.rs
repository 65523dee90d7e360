//! # CLI Argument Definitions
//!
//! Global flags may appear before or after the subcommand.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hbsdcontrol")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Per-file PaX feature control for HardenedBSD")]
pub struct Cli {
    /// Increase verbosity (up to three times)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Operate on targets that are not regular files
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Mark the file immutable after a successful change
    #[arg(short, long, global = true)]
    pub immutable: bool,

    /// Keep going after a failure instead of stopping at the first one
    #[arg(short, long, global = true)]
    pub keep_going: bool,

    /// Settings file (defaults to /etc/hbsdcontrol.toml when present)
    #[arg(long, value_name = "PATH", global = true, env = "HBSDCONTROL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage PaX feature attributes
    Pax {
        #[command(subcommand)]
        action: PaxAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum PaxAction {
    /// Explicitly enable a feature
    Enable {
        feature: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Explicitly disable a feature
    Disable {
        feature: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show the state of one feature
    Status {
        feature: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove both attributes of a feature, falling back to the system default
    Reset {
        feature: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove the attributes of every feature
    #[command(name = "reset-all")]
    ResetAll {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show every feature that has attributes on the file
    List {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the known features and their attribute names
    Features {},
}

impl PaxAction {
    /// Files named on the command line, empty for `features`.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        match self {
            Self::Enable { files, .. }
            | Self::Disable { files, .. }
            | Self::Status { files, .. }
            | Self::Reset { files, .. }
            | Self::ResetAll { files }
            | Self::List { files } => files,
            Self::Features {} => &[],
        }
    }

    /// Whether the action writes attributes.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Enable { .. } | Self::Disable { .. } | Self::Reset { .. } | Self::ResetAll { .. }
        )
    }

    /// Whether the action touches file attributes at all.
    #[must_use]
    pub const fn needs_privilege(&self) -> bool {
        !matches!(self, Self::Features {})
    }
}
