//! `civman config`: view and change settings.

use anyhow::Result;
use civman_core::ConfigStore;
use serde_json::Value;

use crate::config_commands::ConfigCommand;
use crate::error::CliError;

/// Settings shown by `config show`, in display order.
pub const KNOWN_KEYS: [&str; 8] = [
    "comfy_path",
    "api_key",
    "top_image_count",
    "fetch_batch_size",
    "rate_limit_delay",
    "download_cooldown",
    "log_level",
    "theme",
];

/// Execute a config subcommand.
pub fn execute(store: &mut ConfigStore, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => show(store),
        ConfigCommand::Get { key } => {
            match store.get_value(&key) {
                Some(value) => println!("{}", display_value(&key, value)),
                None => println!("{key} is not set"),
            }
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Arguments("Setting name cannot be empty".to_string()).into());
            }
            store.set_from_str(key, &value).map_err(CliError::from)?;
            store.save().map_err(CliError::from)?;
            println!("{key} updated");
            Ok(())
        }
    }
}

fn show(store: &ConfigStore) -> Result<()> {
    let mut settings = store.settings();
    settings.apply_env_overrides();

    println!("Config file: {}", store.path().display());
    println!();
    for key in KNOWN_KEYS {
        let stored = store
            .get_value(key)
            .map_or_else(|| "(not set)".to_string(), |v| display_value(key, v));
        println!("{key:<18} {stored}");
    }
    for (key, value) in store.document() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            println!("{key:<18} {}", display_value(key, value));
        }
    }

    println!();
    println!("Effective values:");
    println!(
        "  destination      {}",
        settings
            .destination_root()
            .map_or_else(|| "(not set)".to_string(), |p| p.display().to_string())
    );
    println!(
        "  api key          {}",
        settings.effective_api_key().map_or_else(|| "(anonymous)".to_string(), mask_secret)
    );
    println!("  images/model     {}", settings.effective_top_image_count());
    println!("  page size        {}", settings.effective_fetch_batch_size());
    println!(
        "  request delay    {:.2}s",
        settings.effective_rate_limit_delay().as_secs_f64()
    );
    println!(
        "  cooldown         {:.2}s",
        settings.effective_download_cooldown().as_secs_f64()
    );
    println!("  log level        {}", settings.effective_log_level());
    Ok(())
}

/// Render a stored value; strings without quotes, the API key masked.
fn display_value(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) if key == "api_key" => mask_secret(s),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Keep only the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(8))
}
