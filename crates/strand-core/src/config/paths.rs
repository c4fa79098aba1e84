//! Standard locations for strand configuration files

use std::path::PathBuf;

/// Get the default configuration directory
///
/// Returns: `<user config dir>/strand` (e.g. `~/.config/strand` on Linux),
/// or `./strand` when the platform has no config directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("strand")
}

/// Get the default path of a config file
///
/// # Arguments
/// * `filename` - Config file name (e.g., "soak.yaml")
pub fn default_config_path(filename: &str) -> PathBuf {
    default_config_dir().join(filename)
}
