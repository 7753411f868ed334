//! CLI entry point, the composition root.
//!
//! Settings are loaded before logging starts so `log_level` can drive the
//! filter. `paths` and `config` only need the settings file; every other
//! command goes through [`bootstrap`].

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use civman_cli::handlers::{self, download::DownloadArgs, search::SearchArgs};
use civman_cli::{Cli, CliConfig, Commands, bootstrap, exit_code_for};
use tracing_subscriber::EnvFilter;

/// Map the `log_level` setting to a tracing filter directive.
fn filter_directive(log_level: &str, verbose: bool) -> String {
    if verbose {
        return "debug".to_string();
    }
    match log_level.to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        other => other.to_string(),
    }
}

fn init_logging(log_level: &str, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level, verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::with_defaults()?;
    let mut store = config.load_store()?;
    let settings = store.settings();
    init_logging(settings.effective_log_level(), cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let command = match command {
        Commands::Paths => return handlers::paths::execute(&config, &settings),
        Commands::Config { command } => return handlers::config::execute(&mut store, command),
        other => other,
    };

    let ctx = bootstrap(&config, store)?;
    match command {
        Commands::Download {
            urls,
            from_file,
            max_images,
            root,
        } => {
            let args = DownloadArgs {
                urls,
                from_file,
                max_images,
                root,
            };
            handlers::download::execute(&ctx, args).await?;
        }
        Commands::Info { url } => handlers::info::execute(&ctx, &url).await?,
        Commands::Search {
            query,
            tags,
            types,
            base_models,
            nsfw,
            limit,
        } => {
            let args = SearchArgs {
                query,
                tags,
                types,
                base_models,
                nsfw,
                limit,
            };
            handlers::search::execute(&ctx, args).await?;
        }
        Commands::List {
            favorites,
            category,
        } => handlers::list::execute(&ctx, favorites, category.as_deref())?,
        Commands::Show { id } => handlers::list::show(&ctx, id)?,
        Commands::Favorite { id, off } => handlers::catalog::favorite(&ctx, id, !off)?,
        Commands::Remove {
            id,
            delete_files,
            force,
        } => handlers::remove::execute(&ctx, id, delete_files, force)?,
        Commands::Scan => handlers::catalog::scan(&ctx)?,
        Commands::Storage => handlers::storage::execute(&ctx)?,
        Commands::Export { path } => handlers::transfer::export(&ctx, &path)?,
        Commands::Import { path, yes } => handlers::transfer::import(&ctx, &path, yes)?,
        Commands::Paths | Commands::Config { .. } => {}
    }

    ctx.catalog.flush().map_err(civman_cli::CliError::from)?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables (CIVITAI_API_KEY, CIVMAN_DATA_DIR, RUST_LOG)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            let code = exit_code_for(&e);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
