//! Subcommands of the `scanzo` binary.

pub mod batch;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use scanzo_core::ScanzoConfig;

/// `<config dir>/scanzo/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scanzo")
        .join("config.json")
}

/// Load the configuration from `--config`, else from the default location
/// when it exists, else the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ScanzoConfig> {
    if let Some(path) = config_path {
        return Ok(ScanzoConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        Ok(ScanzoConfig::from_file(&default_path)?)
    } else {
        Ok(ScanzoConfig::default())
    }
}
