//! External collaborators of a compatibility run
//!
//! Each tool sits behind a `Send + Sync` trait so the pipeline can be driven
//! by the real programs or by in-process fakes. Per-object failures are
//! returned as [`ToolOutcome`] / [`ComparisonOutcome`] values; only preflight
//! checks produce errors.

pub mod checker;
pub mod dumper;
pub mod external;
pub mod objdump;
pub mod versions;

pub use checker::{parse_stat_line, AbiComplianceChecker};
pub use dumper::{AbiDumper, DumperOptions};
pub use external::{find_tool, is_tool_installed, run_external_tool, ExternalToolResult};
pub use objdump::Objdump;

use crate::config::ToolsConfig;
use crate::error::AbidiffResult;
use crate::models::{CheckKind, CompatibilityRecord, PackageAttrs, PackageFormat};
use crate::packages::SystemPackageTool;
use std::path::{Path, PathBuf};

/// Outcome of one descriptor extractor invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// The expected artifact exists at this path
    Produced(PathBuf),
    /// The tool ran (or failed to) without leaving the artifact behind
    Missing { reason: String },
}

impl ToolOutcome {
    /// Decide from the filesystem whether `artifact` was produced
    pub fn from_artifact(artifact: &Path, result: &ExternalToolResult) -> Self {
        if artifact.exists() {
            ToolOutcome::Produced(artifact.to_path_buf())
        } else if result.exited_cleanly() {
            ToolOutcome::Missing {
                reason: format!("no output at '{}'", artifact.display()),
            }
        } else {
            ToolOutcome::Missing {
                reason: result.describe_failure(),
            }
        }
    }
}

/// Outcome of one comparator invocation for a mapped pair
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOutcome {
    /// One record per requested check kind
    Compared(Vec<CompatibilityRecord>),
    Failed { reason: String },
}

/// Reads metadata from and unpacks package archives
pub trait PackageTool: Send + Sync {
    fn attributes(&self, path: &Path, format: PackageFormat) -> anyhow::Result<PackageAttrs>;

    fn extract(&self, path: &Path, format: PackageFormat, dest: &Path) -> anyhow::Result<()>;
}

/// Reads the SONAME of a shared object
pub trait ObjectInspector: Send + Sync {
    fn soname(&self, object: &Path) -> Option<String>;
}

/// Everything the extractor needs to describe one object
#[derive(Debug, Clone)]
pub struct DumpRequest {
    pub object: PathBuf,
    pub output: PathBuf,
    /// Version label recorded in the descriptor
    pub version: String,
    pub debuginfo_dir: PathBuf,
    pub headers_dir: Option<PathBuf>,
    /// Tool stdout is appended here when set
    pub log: Option<PathBuf>,
}

/// Turns an object plus its debug symbols into an ABI descriptor
pub trait DescriptorExtractor: Send + Sync {
    /// Fail early when the tool is missing or too old
    fn check_version(&self) -> AbidiffResult<()> {
        Ok(())
    }

    fn dump(&self, request: &DumpRequest) -> ToolOutcome;
}

/// Everything the comparator needs for one mapped pair
#[derive(Debug, Clone)]
pub struct CompareRequest {
    /// Old object basename, used as the library label and report subdirectory
    pub object: String,
    pub old_descriptor: PathBuf,
    pub new_descriptor: PathBuf,
    pub kinds: Vec<CheckKind>,
    pub report_dir: PathBuf,
    pub log: Option<PathBuf>,
}

impl CompareRequest {
    pub fn object_dir(&self) -> PathBuf {
        crate::cache::get_object_report_dir(&self.report_dir, &self.object)
    }

    /// Report location relative to the report directory
    pub fn report_link(&self, kind: CheckKind) -> String {
        format!("{}/{}", self.object, kind.report_file())
    }
}

/// Diffs two descriptors and counts live symbols
pub trait Comparator: Send + Sync {
    fn check_version(&self) -> AbidiffResult<()> {
        Ok(())
    }

    fn compare(&self, request: &CompareRequest) -> ComparisonOutcome;

    fn count_symbols(&self, descriptor: &Path) -> anyhow::Result<u64>;
}

/// The set of collaborators a run is wired with
pub struct Toolchain {
    pub packages: Box<dyn PackageTool>,
    pub inspector: Box<dyn ObjectInspector>,
    pub extractor: Box<dyn DescriptorExtractor>,
    pub comparator: Box<dyn Comparator>,
}

impl Toolchain {
    /// Wire the real system programs
    pub fn system(tools: &ToolsConfig, options: DumperOptions) -> Self {
        Self {
            packages: Box::new(SystemPackageTool::new(tools.timeout_secs)),
            inspector: Box::new(Objdump::new(&tools.objdump, tools.timeout_secs)),
            extractor: Box::new(AbiDumper::new(
                &tools.abi_dumper,
                options,
                tools.timeout_secs,
            )),
            comparator: Box::new(AbiComplianceChecker::new(
                &tools.abi_compliance_checker,
                tools.timeout_secs,
            )),
        }
    }

    /// Check the minimum versions of the ABI tools
    pub fn preflight(&self) -> AbidiffResult<()> {
        self.comparator.check_version()?;
        self.extractor.check_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_outcome_from_artifact() {
        let dir = TempDir::new().unwrap();
        let artifact = dir.path().join("ABI.dump");
        let ok = ExternalToolResult::success(String::new(), String::new(), 0);

        match ToolOutcome::from_artifact(&artifact, &ok) {
            ToolOutcome::Missing { reason } => assert!(reason.contains("no output")),
            other => panic!("unexpected {:?}", other),
        }

        let failed = ExternalToolResult::success(String::new(), "ERROR: bad\n".into(), 1);
        assert_eq!(
            ToolOutcome::from_artifact(&artifact, &failed),
            ToolOutcome::Missing {
                reason: "exit code 1: ERROR: bad".into()
            }
        );

        std::fs::write(&artifact, "x").unwrap();
        assert_eq!(
            ToolOutcome::from_artifact(&artifact, &failed),
            ToolOutcome::Produced(artifact.clone())
        );
    }

    #[test]
    fn test_report_link() {
        let req = CompareRequest {
            object: "libfoo.so.1".into(),
            old_descriptor: PathBuf::from("a"),
            new_descriptor: PathBuf::from("b"),
            kinds: vec![CheckKind::Binary],
            report_dir: PathBuf::from("out"),
            log: None,
        };
        assert_eq!(
            req.report_link(CheckKind::Binary),
            "libfoo.so.1/abi_compat_report.html"
        );
        assert_eq!(req.object_dir(), PathBuf::from("out/libfoo.so.1"));
    }
}
