//! Root parser and global options.

use clap::Parser;

use crate::commands::Commands;

/// Download Civitai models into a `ComfyUI` tree and keep a local catalog.
#[derive(Parser)]
#[command(name = "civman")]
#[command(about = "Download and catalog Civitai models")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_verbose_after_subcommand() {
        let cli = Cli::parse_from(["civman", "list", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::List { .. })));
    }

    #[test]
    fn test_no_command_is_allowed() {
        let cli = Cli::parse_from(["civman"]);
        assert!(cli.command.is_none());
    }
}
