//! Configuration module for pkg-abidiff
//!
//! This module handles:
//! - Run configuration (`pkg-abidiff.toml` or the user config)
//! - Tool program overrides and timeouts
//! - Environment overrides of the output roots

mod project_config;
mod user_config;

pub use project_config::{
    load_config, load_toml_config, AbidiffConfig, PathsConfig, RunDefaults, ToolsConfig,
    CONFIG_FILE, ENV_DUMPS_DIR, ENV_REPORT_DIR,
};
pub use user_config::user_config_path;
