use std::path::PathBuf;

use clap::{
  ArgAction,
  Parser,
  Subcommand,
};
use closetag_lib::Position;

#[derive(Parser, Debug)]
#[command(
  name = "closetag",
  about = "Closes HTML-like tags in text files",
  long_about = None,
  version
)]
pub struct Cli {
  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = ArgAction::Count, global = true)]
  pub verbosity: u8,

  /// Save logs to a specific file
  #[arg(long = "log", value_name = "FILE", global = true)]
  pub log_file: Option<PathBuf>,

  /// Load configuration from a specific file
  #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
  pub config_file: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// List every tag left unclosed, as `line:name`
  Scan { file: PathBuf },

  /// Close the most recently opened unclosed tag at a position
  Close {
    file:  PathBuf,
    /// Zero-based `ROW:COL`, columns counted in characters
    #[arg(long, value_name = "ROW:COL")]
    at:    Position,
    /// Write the result back instead of printing it
    #[arg(long)]
    write: bool,
  },

  /// Replay typing at a position, auto-closing tags as they are opened
  Type {
    file:        PathBuf,
    /// Zero-based `ROW:COL`, columns counted in characters
    #[arg(long, value_name = "ROW:COL")]
    at:          Position,
    #[arg(long)]
    text:        String,
    /// Insert the whole text at once, like a paste
    #[arg(long)]
    paste:       bool,
    /// Pause between keystrokes
    #[arg(long, value_name = "MS", default_value_t = 50)]
    interval_ms: u64,
    /// Write the result back instead of printing it
    #[arg(long)]
    write:       bool,
  },

  /// Inspect or change the persisted configuration
  Config {
    #[command(subcommand)]
    action: ConfigAction,
  },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
  /// Print the config file location
  Path,
  /// Print the effective configuration
  Show,
  /// Set one option and save it
  Set { key: String, value: String },
}
