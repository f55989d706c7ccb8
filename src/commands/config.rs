//! Configuration commands.

use super::{prompt, App};
use crate::config::{Config, CONFIG_KEYS};
use crate::vendors::ProviderKind;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

fn user_config_path() -> Result<PathBuf> {
    Config::user_config_path().context("Cannot determine home directory")
}

/// Set a key in the user config, prompting for the value when it is not
/// given on the command line.
pub fn set(app: &App, key: &str, value: Option<&str>) -> Result<()> {
    let value = match value {
        Some(value) => value.to_string(),
        None => prompt(&format!("Enter value for {}: ", key))?
            .with_context(|| format!("no value given for {}", key))?,
    };

    let path = user_config_path()?;
    set_in(&path, key, &value, app.config.active_provider())?;
    println!("✓ Set {}", key);
    Ok(())
}

/// Update one key in a config file, leaving its other settings alone.
fn set_in(path: &Path, key: &str, value: &str, active: ProviderKind) -> Result<()> {
    let mut config = if path.exists() {
        Config::load_from(path)?
    } else {
        Config::default()
    };
    config.set_value(key, value, active)?;
    config.save_to(path)
}

pub fn get(app: &App, key: &str) -> Result<()> {
    println!("{}", app.config.get_value(key)?);
    Ok(())
}

pub fn list(app: &App) -> Result<()> {
    println!("\nConfiguration:");
    println!("─────────────────────────────────────");
    for (key, help) in CONFIG_KEYS {
        let value = app.config.get_value(key)?;
        println!("  {:<20} {:<36} {}", key, value, help);
    }

    let configured: Vec<&str> = app
        .config
        .configured_providers()
        .into_iter()
        .map(|k| k.as_str())
        .collect();
    println!("\n  Usable providers: {}", configured.join(", "));
    if let Some(path) = Config::user_config_path() {
        println!("  User config: {}", path.display());
    }
    println!();
    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", user_config_path()?.display());
    Ok(())
}
