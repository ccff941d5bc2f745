//! User-level configuration location

use std::path::PathBuf;

/// Get the user config path (`~/.config/pkg-abidiff/config.toml` on Linux)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pkg-abidiff").join("config.toml"))
}
