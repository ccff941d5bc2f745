//! Run configuration (`pkg-abidiff.toml`)
//!
//! ```toml
//! [paths]
//! dumps_dir = "abi_dump"
//! report_dir = "compat_report"
//!
//! [tools]
//! abi_dumper = "abi-dumper"
//! abi_compliance_checker = "abi-compliance-checker"
//! objdump = "objdump"
//! timeout_secs = 0
//!
//! [defaults]
//! workers = 8
//! ```

use super::user_config::user_config_path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE: &str = "pkg-abidiff.toml";

/// Environment override for `[paths] dumps_dir`
pub const ENV_DUMPS_DIR: &str = "PKG_ABIDIFF_DUMPS_DIR";
/// Environment override for `[paths] report_dir`
pub const ENV_REPORT_DIR: &str = "PKG_ABIDIFF_REPORT_DIR";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AbidiffConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub defaults: RunDefaults,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the descriptor cache
    pub dumps_dir: PathBuf,
    /// Root under which default report directories are created
    pub report_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            dumps_dir: PathBuf::from("abi_dump"),
            report_dir: PathBuf::from("compat_report"),
        }
    }
}

/// Program names (or paths) of the external tools
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub abi_dumper: String,
    pub abi_compliance_checker: String,
    pub objdump: String,
    /// Per-invocation timeout; 0 leaves tools unbounded
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            abi_dumper: "abi-dumper".to_string(),
            abi_compliance_checker: "abi-compliance-checker".to_string(),
            objdump: "objdump".to_string(),
            timeout_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunDefaults {
    /// Comparator worker threads (default: CPU count)
    pub workers: Option<usize>,
}

impl AbidiffConfig {
    /// Worker count from config or the machine, clamped to 1..=64
    pub fn workers(&self) -> usize {
        let n = self.defaults.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        });
        n.clamp(1, 64)
    }

    /// Apply environment overrides; `lookup` stands in for `std::env::var`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_DUMPS_DIR).filter(|v| !v.is_empty()) {
            self.paths.dumps_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_REPORT_DIR).filter(|v| !v.is_empty()) {
            self.paths.report_dir = PathBuf::from(dir);
        }
    }
}

/// Load configuration from a TOML file
pub fn load_toml_config(path: &Path) -> Result<AbidiffConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load configuration, trying in order:
/// 1. `pkg-abidiff.toml` in `dir`
/// 2. the user config (`~/.config/pkg-abidiff/config.toml`)
///
/// Environment overrides are applied on top. Returns defaults if no config
/// file is found or the one found doesn't parse.
pub fn load_config(dir: &Path) -> AbidiffConfig {
    let candidates = [Some(dir.join(CONFIG_FILE)), user_config_path()];
    let mut config = None;

    for path in candidates.into_iter().flatten() {
        if !path.exists() {
            continue;
        }
        match load_toml_config(&path) {
            Ok(c) => {
                debug!("Loaded config from {}", path.display());
                config = Some(c);
                break;
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", path.display(), e);
                break;
            }
        }
    }

    let mut config = config.unwrap_or_else(|| {
        debug!("No config found, using defaults");
        AbidiffConfig::default()
    });
    config.apply_env(|key| std::env::var(key).ok());
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AbidiffConfig::default();
        assert_eq!(config.paths.dumps_dir, PathBuf::from("abi_dump"));
        assert_eq!(config.paths.report_dir, PathBuf::from("compat_report"));
        assert_eq!(config.tools.abi_dumper, "abi-dumper");
        assert_eq!(config.tools.timeout_secs, 0);
        assert!((1..=64).contains(&config.workers()));
    }

    #[test]
    fn test_partial_toml() {
        let config: AbidiffConfig = toml::from_str(
            r#"
[tools]
abi_compliance_checker = "/opt/abi-cc/bin/abi-compliance-checker"
timeout_secs = 600

[defaults]
workers = 200
"#,
        )
        .unwrap();
        assert_eq!(
            config.tools.abi_compliance_checker,
            "/opt/abi-cc/bin/abi-compliance-checker"
        );
        assert_eq!(config.tools.objdump, "objdump");
        assert_eq!(config.tools.timeout_secs, 600);
        assert_eq!(config.paths, PathsConfig::default());
        assert_eq!(config.workers(), 64);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[paths]\ndumps_dir = \"/var/cache/abi\"\n",
        )
        .unwrap();
        let config = load_toml_config(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.paths.dumps_dir, PathBuf::from("/var/cache/abi"));
        assert_eq!(config.paths.report_dir, PathBuf::from("compat_report"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[paths\n").unwrap();
        assert!(load_toml_config(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AbidiffConfig::default();
        config.apply_env(|key| match key {
            ENV_DUMPS_DIR => Some("/tmp/dumps".to_string()),
            ENV_REPORT_DIR => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.paths.dumps_dir, PathBuf::from("/tmp/dumps"));
        assert_eq!(config.paths.report_dir, PathBuf::from("compat_report"));
    }
}
