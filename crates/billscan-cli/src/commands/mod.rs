//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use billscan_core::BillscanConfig;
use tracing::debug;

/// Default config location, `<config dir>/billscan/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("billscan")
        .join("config.json")
}

/// Resolve the config file in use: the explicit path, else the default.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the config, falling back to defaults when no file exists.
///
/// An explicitly named file must exist.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<BillscanConfig> {
    let path = config_path(explicit);
    if explicit.is_some() || path.exists() {
        debug!("Loading config from {}", path.display());
        return read_config(&path);
    }
    Ok(BillscanConfig::default())
}

fn read_config(path: &Path) -> anyhow::Result<BillscanConfig> {
    BillscanConfig::from_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))
}
