pub mod check;
pub mod fix;
pub mod libraries;

use color_eyre::Result;
use media_match_config::{Config, PathManager};
use std::path::{Path, PathBuf};

/// `--config` if given, else the default config file location
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| PathManager::default().config_file())
}

pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load_from_file(path)?;
    config.validate()?;
    tracing::debug!(config = %path.display(), pvrs = ?config.pvr_names(), "Loaded configuration");
    Ok(config)
}

fn table() -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}
