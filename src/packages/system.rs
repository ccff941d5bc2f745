//! rpm / dpkg backed package tooling

use crate::models::{PackageAttrs, PackageFormat};
use crate::tools::{run_external_tool, PackageTool};
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Parse `rpm -qp --queryformat %{name},%{version},%{release},%{arch}` output.
/// The package version is `version-release`.
pub fn parse_rpm_query(output: &str) -> Option<PackageAttrs> {
    let parts: Vec<&str> = output.trim().split(',').collect();
    if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(PackageAttrs {
        name: parts[0].to_string(),
        version: format!("{}-{}", parts[1], parts[2]),
        arch: parts[3].to_string(),
    })
}

/// Parse `dpkg -f PKG Package Version Architecture` output
pub fn parse_dpkg_fields(output: &str) -> Option<PackageAttrs> {
    let mut name = None;
    let mut version = None;
    let mut arch = None;
    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "Package" => name = Some(value),
            "Version" => version = Some(value),
            "Architecture" => arch = Some(value),
            _ => {}
        }
    }
    Some(PackageAttrs {
        name: name?,
        version: version?,
        arch: arch?,
    })
}

pub struct SystemPackageTool {
    timeout_secs: u64,
}

impl SystemPackageTool {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    fn run(&self, cmd: Vec<String>, tool: &str, cwd: Option<&Path>) -> Result<String> {
        let result = run_external_tool(&cmd, tool, self.timeout_secs, cwd);
        if !result.exited_cleanly() {
            bail!("{}", result.describe_failure());
        }
        Ok(result.stdout)
    }
}

impl PackageTool for SystemPackageTool {
    fn attributes(&self, path: &Path, format: PackageFormat) -> Result<PackageAttrs> {
        let pkg = path.to_string_lossy().to_string();
        match format {
            PackageFormat::Rpm => {
                let cmd = vec![
                    "rpm".to_string(),
                    "-qp".to_string(),
                    "--queryformat".to_string(),
                    "%{name},%{version},%{release},%{arch}".to_string(),
                    pkg,
                ];
                let out = self.run(cmd, "rpm", None)?;
                parse_rpm_query(&out).with_context(|| format!("unexpected rpm output {:?}", out))
            }
            PackageFormat::Deb => {
                let cmd = vec![
                    "dpkg".to_string(),
                    "-f".to_string(),
                    pkg,
                    "Package".to_string(),
                    "Version".to_string(),
                    "Architecture".to_string(),
                ];
                let out = self.run(cmd, "dpkg", None)?;
                parse_dpkg_fields(&out).with_context(|| format!("unexpected dpkg output {:?}", out))
            }
        }
    }

    fn extract(&self, path: &Path, format: PackageFormat, dest: &Path) -> Result<()> {
        std::fs::create_dir_all(dest)
            .with_context(|| format!("can't create '{}'", dest.display()))?;
        let pkg = std::fs::canonicalize(path)
            .with_context(|| format!("can't access '{}'", path.display()))?
            .to_string_lossy()
            .to_string();
        match format {
            PackageFormat::Rpm => {
                let cmd = vec![
                    "sh".to_string(),
                    "-c".to_string(),
                    r#"rpm2cpio "$1" | cpio -id --quiet"#.to_string(),
                    "sh".to_string(),
                    pkg,
                ];
                self.run(cmd, "rpm2cpio", Some(dest))?;
            }
            PackageFormat::Deb => {
                let cmd = vec![
                    "dpkg-deb".to_string(),
                    "--extract".to_string(),
                    pkg,
                    dest.to_string_lossy().to_string(),
                ];
                self.run(cmd, "dpkg-deb", None)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rpm_query() {
        let attrs = parse_rpm_query("libfoo-debuginfo,1.2,3.fc40,x86_64").unwrap();
        assert_eq!(attrs.name, "libfoo-debuginfo");
        assert_eq!(attrs.version, "1.2-3.fc40");
        assert_eq!(attrs.arch, "x86_64");

        assert!(parse_rpm_query("").is_none());
        assert!(parse_rpm_query("a,b,c").is_none());
    }

    #[test]
    fn test_parse_dpkg_fields() {
        let out = "Package: libfoo1-dbg\nVersion: 1.2-3\nArchitecture: amd64\n";
        let attrs = parse_dpkg_fields(out).unwrap();
        assert_eq!(attrs.name, "libfoo1-dbg");
        assert_eq!(attrs.version, "1.2-3");
        assert_eq!(attrs.arch, "amd64");

        assert!(parse_dpkg_fields("Package: x\n").is_none());
    }
}
