//! Configuration subcommands.

use clap::Subcommand;

/// Settings commands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show every stored setting and the effective values
    Show,
    /// Print one stored value
    Get {
        /// Setting name, e.g. comfy_path
        key: String,
    },
    /// Store a value (numbers and booleans are parsed, everything else is text)
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
}
