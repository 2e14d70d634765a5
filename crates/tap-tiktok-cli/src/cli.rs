//! CLI argument definitions.
//!
//! # Examples
//!
//! ```bash
//! # Sync every stream
//! tap-tiktok --config config.json > records.ndjson
//!
//! # Sync selected streams with debug logging
//! tap-tiktok --config config.json --stream campaigns --stream ads --log-level debug
//!
//! # Show available streams
//! tap-tiktok --list-streams
//! ```

use std::path::PathBuf;

use clap::Parser;

/// Extract TikTok Business API data as Singer record messages.
///
/// Records are written to stdout as newline-delimited JSON; logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "tap-tiktok", author, version, about)]
pub struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, required_unless_present = "list_streams")]
    pub config: Option<PathBuf>,

    /// Stream to sync; repeat for several. Defaults to every stream.
    #[arg(long = "stream", value_name = "NAME")]
    pub streams: Vec<String>,

    /// Print the available stream names and exit.
    #[arg(long, default_value_t = false)]
    pub list_streams: bool,

    /// Log filter used when RUST_LOG is unset (e.g. info, debug, tap_tiktok_core=trace).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
