//! CLI command definitions.

use clap::Subcommand;
use gatekeep_payload::file::BINARY_MIME_TYPE;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Read commands from stdin, one per line
    Console {
        /// Principal the commands are sent as
        #[arg(short, long)]
        principal: i64,
    },

    /// Run a single command
    Exec {
        /// Principal the command is sent as
        #[arg(short, long)]
        principal: i64,

        /// Command and arguments, e.g. `redeem abcDEF12345`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Render a local file through the upload path
    EncodeFile {
        /// Principal the upload is sent as
        #[arg(short, long)]
        principal: i64,

        /// File to upload
        path: PathBuf,

        /// MIME type reported for the file
        #[arg(long, default_value = BINARY_MIME_TYPE)]
        mime_type: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
}
