//! Subcommand definitions.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config_commands::ConfigCommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Download one or more models by page URL
    Download {
        /// Model page URLs (https://civitai.com/models/<id>[?modelVersionId=<id>])
        urls: Vec<String>,
        /// Also read URLs from a text file (any text; model links are extracted)
        #[arg(long = "from-file", value_name = "FILE")]
        from_file: Option<PathBuf>,
        /// Gallery images to keep per model (overrides `top_image_count`)
        #[arg(long = "max-images", value_name = "N")]
        max_images: Option<usize>,
        /// Destination root (overrides `comfy_path`)
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },
    /// Show platform metadata for a model without downloading it
    Info {
        /// Model page URL
        url: String,
    },
    /// Search the platform catalog
    Search {
        /// Free-text query
        query: String,
        /// Tag filter (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Model type filter, e.g. LORA or Checkpoint (repeatable)
        #[arg(long = "type")]
        types: Vec<String>,
        /// Base model filter, e.g. "SD 1.5" (repeatable)
        #[arg(long = "base-model")]
        base_models: Vec<String>,
        /// Include (true) or hide (false) NSFW results
        #[arg(long)]
        nsfw: Option<bool>,
        /// Maximum results
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
    /// List models in the local catalog
    List {
        /// Only favorites
        #[arg(long)]
        favorites: bool,
        /// Only one model type
        #[arg(long = "type", value_name = "TYPE")]
        category: Option<String>,
    },
    /// Show one catalog entry
    Show {
        /// Model id
        id: u64,
    },
    /// Mark a model as favorite
    Favorite {
        /// Model id
        id: u64,
        /// Remove the mark instead
        #[arg(long)]
        off: bool,
    },
    /// Remove a model from the catalog
    Remove {
        /// Model id
        id: u64,
        /// Also delete the model folder from disk
        #[arg(long)]
        delete_files: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Rebuild catalog entries from metadata.json files on disk
    Scan,
    /// Show disk usage of the destination root
    Storage,
    /// Write the catalog to a JSON file
    Export {
        /// Output file
        path: PathBuf,
    },
    /// Merge an exported catalog into the local one
    Import {
        /// Exported catalog file
        path: PathBuf,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// View or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Show the files and folders civman uses
    Paths,
}

#[cfg(test)]
mod tests {
    use crate::parser::Cli;
    use crate::{Commands, ConfigCommand};
    use clap::Parser;

    #[test]
    fn test_download_args() {
        let cli = Cli::parse_from([
            "civman",
            "download",
            "https://civitai.com/models/1",
            "https://civitai.com/models/2",
            "--max-images",
            "3",
            "--root",
            "/srv/comfy",
        ]);
        let Some(Commands::Download {
            urls,
            from_file,
            max_images,
            root,
        }) = cli.command
        else {
            panic!("expected download");
        };
        assert_eq!(urls.len(), 2);
        assert!(from_file.is_none());
        assert_eq!(max_images, Some(3));
        assert_eq!(root.unwrap().to_str(), Some("/srv/comfy"));
    }

    #[test]
    fn test_search_repeatable_filters() {
        let cli = Cli::parse_from([
            "civman", "search", "detail", "--type", "LORA", "--type", "LoCon", "--nsfw", "false",
        ]);
        let Some(Commands::Search {
            query,
            types,
            nsfw,
            limit,
            ..
        }) = cli.command
        else {
            panic!("expected search");
        };
        assert_eq!(query, "detail");
        assert_eq!(types, vec!["LORA", "LoCon"]);
        assert_eq!(nsfw, Some(false));
        assert_eq!(limit, 20);
    }

    #[test]
    fn test_remove_flags() {
        let cli = Cli::parse_from(["civman", "remove", "42", "--delete-files", "-f"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Remove {
                id: 42,
                delete_files: true,
                force: true
            })
        ));
    }

    #[test]
    fn test_config_set() {
        let cli = Cli::parse_from(["civman", "config", "set", "top_image_count", "4"]);
        let Some(Commands::Config {
            command: ConfigCommand::Set { key, value },
        }) = cli.command
        else {
            panic!("expected config set");
        };
        assert_eq!(key, "top_image_count");
        assert_eq!(value, "4");
    }
}
