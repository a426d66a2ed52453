//! Command-line argument parsing for the replay tool
//!
//! Supports:
//! - Replaying a JSON or YAML script of host events
//! - An explicit config file instead of the user config
//! - Compact or pretty JSON output

use clap::Parser;
use std::path::PathBuf;

/// Replay host events against a rich-text view and print its final state
#[derive(Parser, Debug)]
#[command(
    name = "richedit",
    version,
    about = "Replay host events against a rich-text view"
)]
pub struct CliArgs {
    /// Script to replay (`.json`, otherwise YAML)
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Config file to use instead of ~/.config/richedit/config.yaml
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Initial text, set before the first step
    #[arg(short, long, value_name = "TEXT")]
    pub text: Option<String>,

    /// Pretty-print the JSON report
    #[arg(short, long)]
    pub pretty: bool,

    /// Leave the command log out of the report
    #[arg(long)]
    pub no_commands: bool,

    /// Don't write a log file
    #[arg(long)]
    pub no_log_file: bool,
}
