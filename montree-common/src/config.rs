//! Configuration loading and data folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Database file name inside the data folder
pub const DATABASE_FILE: &str = "montree.db";

/// Data folder resolution priority order:
/// 1. Explicit argument (highest priority)
/// 2. `MONTREE_DATA` environment variable
/// 3. TOML config file (`data_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(explicit: Option<&str>) -> PathBuf {
    // Priority 1: explicit argument
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    // Priority 2: environment variable
    if let Ok(path) = std::env::var("MONTREE_DATA") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(folder) = config.get("data_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent default
    default_data_folder()
}

/// Full path to the database file for a resolved data folder
pub fn database_path(explicit: Option<&str>) -> PathBuf {
    resolve_data_folder(explicit).join(DATABASE_FILE)
}

/// Locate the config file for the platform
fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // ~/.config/montree/config.toml first, then /etc/montree/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("montree").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/montree/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let path = dirs::config_dir()
        .map(|d| d.join("montree").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("montree"))
        .unwrap_or_else(|| PathBuf::from("./montree_data"))
}
