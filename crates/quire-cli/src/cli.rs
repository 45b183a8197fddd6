//! CLI argument definitions for the Quire document tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "quire",
    version,
    about = "Inspect, convert and re-save Quire documents",
    long_about = "Inspect, convert and re-save Quire documents.\n\n\
                  Opens text and notebook documents through the same document\n\
                  lifecycle the editor uses, answering prompts headlessly."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file to use instead of the one in the user config directory.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show a document's class, type and contents summary.
    Inspect {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Write a copy of a document in another type, leaving the source as is.
    Export(ExportArgs),

    /// Save a document in place.
    ///
    /// Imported documents are saved next to the original in the native type.
    Resave(ResaveArgs),

    /// Create an empty document; the extension picks the class.
    Create {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// List every registered document class and type.
    Types,
}

#[derive(Parser)]
pub struct ExportArgs {
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Where to write the copy.
    #[arg(long = "to", short = 'o', value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Type tag to write (default: chosen from the output extension).
    #[arg(long = "type", value_name = "TAG")]
    pub type_tag: Option<String>,
}

#[derive(Parser)]
pub struct ResaveArgs {
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Keep the replaced file as a backup next to the document.
    #[arg(long = "backup")]
    pub backup: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
