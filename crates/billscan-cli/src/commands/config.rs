//! Config command - inspect and edit the JSON configuration.

use std::fs;
use std::path::Path;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use billscan_core::{BillscanConfig, FieldExtractor};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value by dotted key (e.g. "pdf.render_dpi")
    Get {
        key: String,
    },

    /// Change one value by dotted key; the value is parsed as JSON when possible
    Set {
        key: String,
        value: String,
    },

    /// Show the configuration file path
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = super::config_path(config_path);

    match args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init { force } => init(&path, force)?,
        ConfigCommand::Get { key } => {
            let config = super::load_config(config_path)?;
            let json = serde_json::to_value(&config)?;
            let value = lookup(&json, &key)
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Set { key, value } => set(&path, &key, &value)?,
        ConfigCommand::Path => {
            println!("{}", path.display());
            if !path.exists() {
                eprintln!(
                    "{} Not created yet; run 'billscan config init'",
                    style("ℹ").blue()
                );
            }
        }
    }

    Ok(())
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    BillscanConfig::default().save(path)?;
    eprintln!("{} Created {}", style("✓").green(), path.display());
    Ok(())
}

fn set(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let config = if path.exists() {
        BillscanConfig::from_file(path)?
    } else {
        BillscanConfig::default()
    };

    // "8" for a string field should stay the string "8"
    let (updated, value) = match serde_json::from_str::<Value>(raw) {
        Ok(parsed) => match with_value(&config, key, parsed.clone()) {
            Ok(updated) => (updated, parsed),
            Err(_) => {
                let text = Value::String(raw.to_string());
                (with_value(&config, key, text.clone())?, text)
            }
        },
        Err(_) => {
            let text = Value::String(raw.to_string());
            (with_value(&config, key, text.clone())?, text)
        }
    };
    FieldExtractor::from_config(&updated.extraction)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    updated.save(path)?;

    eprintln!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&value)?
    );
    Ok(())
}

/// Copy of `config` with the dotted `key` replaced by `value`.
fn with_value(config: &BillscanConfig, key: &str, value: Value) -> anyhow::Result<BillscanConfig> {
    let mut json = serde_json::to_value(config)?;
    let (parent, leaf) = match key.rsplit_once('.') {
        Some((parent_key, leaf)) => (lookup_mut(&mut json, parent_key), leaf),
        None => (Some(&mut json), key),
    };
    let slot = parent
        .and_then(Value::as_object_mut)
        .and_then(|obj| obj.get_mut(leaf))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    *slot = value;

    serde_json::from_value(json).map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}

fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

fn lookup_mut<'a>(json: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    key.split('.').try_fold(json, |current, part| current.get_mut(part))
}
