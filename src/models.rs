//! Core data models for pkg-abidiff
//!
//! These models are shared by every stage of a run: package classification,
//! object discovery, matching, comparison, scoring and reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Generation a package, file or object belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Release {
    Old,
    New,
}

impl Release {
    pub const ALL: [Release; 2] = [Release::Old, Release::New];

    pub fn as_str(&self) -> &'static str {
        match self {
            Release::Old => "old",
            Release::New => "new",
        }
    }
}

impl std::fmt::Display for Release {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Package archive format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageFormat {
    Rpm,
    Deb,
}

impl PackageFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("rpm") => Some(PackageFormat::Rpm),
            Some("deb") => Some(PackageFormat::Deb),
            _ => None,
        }
    }
}

impl std::fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageFormat::Rpm => write!(f, "rpm"),
            PackageFormat::Deb => write!(f, "deb"),
        }
    }
}

/// Role of a package within a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    /// The package shipping the shared objects
    Release,
    /// Separate debug symbols
    DebugInfo,
    /// Public headers
    Devel,
}

impl PackageKind {
    pub const ALL: [PackageKind; 3] = [
        PackageKind::Release,
        PackageKind::DebugInfo,
        PackageKind::Devel,
    ];

    /// Directory name used under the scratch extraction root
    pub fn dir_name(&self) -> &'static str {
        match self {
            PackageKind::Release => "rel",
            PackageKind::DebugInfo => "debug",
            PackageKind::Devel => "devel",
        }
    }
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageKind::Release => write!(f, "release"),
            PackageKind::DebugInfo => write!(f, "debuginfo"),
            PackageKind::Devel => write!(f, "devel"),
        }
    }
}

/// (name, version, architecture) triple read from package metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageAttrs {
    pub name: String,
    pub version: String,
    pub arch: String,
}

/// A single package file supplied on the command line
#[derive(Debug, Clone)]
pub struct Package {
    pub path: PathBuf,
    pub format: PackageFormat,
    pub kind: PackageKind,
    pub attrs: PackageAttrs,
}

impl Package {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Validated packages of one release
#[derive(Debug, Clone)]
pub struct PackageSet {
    pub release: Release,
    pub binaries: Package,
    pub debug_info: Package,
    pub devel: Option<Package>,
    /// Identity of the release, taken from the debuginfo package
    pub identity: PackageAttrs,
}

impl PackageSet {
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        [Some(&self.binaries), Some(&self.debug_info), self.devel.as_ref()]
            .into_iter()
            .flatten()
    }
}

/// A dynamically-linked library found in a release package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedObject {
    pub path: PathBuf,
    /// File basename, the object's identity within a release
    pub name: String,
    pub soname: Option<String>,
    /// Basename with the shared-object version suffix stripped
    pub short_name: Option<String>,
}

/// Kind of compatibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Binary,
    Source,
}

impl CheckKind {
    /// Short label used in console output
    pub fn label(&self) -> &'static str {
        match self {
            CheckKind::Binary => "BC",
            CheckKind::Source => "SC",
        }
    }

    /// File name of the comparator report for this kind
    pub fn report_file(&self) -> &'static str {
        match self {
            CheckKind::Binary => "abi_compat_report.html",
            CheckKind::Source => "src_compat_report.html",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckKind::Binary => write!(f, "binary"),
            CheckKind::Source => write!(f, "source"),
        }
    }
}

/// Which check kinds a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSelection {
    pub binary: bool,
    pub source: bool,
}

impl CheckSelection {
    /// Build from `--bin` / `--src` flags; neither flag means both checks
    pub fn from_flags(bin: bool, src: bool) -> Self {
        if !bin && !src {
            Self::both()
        } else {
            Self {
                binary: bin,
                source: src,
            }
        }
    }

    pub fn both() -> Self {
        Self {
            binary: true,
            source: true,
        }
    }

    pub fn kinds(&self) -> Vec<CheckKind> {
        let mut kinds = Vec::with_capacity(2);
        if self.binary {
            kinds.push(CheckKind::Binary);
        }
        if self.source {
            kinds.push(CheckKind::Source);
        }
        kinds
    }

    /// Kind whose record supplies added/removed symbol counts
    pub fn primary(&self) -> CheckKind {
        if self.binary {
            CheckKind::Binary
        } else {
            CheckKind::Source
        }
    }
}

/// Per-object, per-kind statistics emitted by the comparator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityRecord {
    pub kind: CheckKind,
    /// Percentage of symbols affected by compatibility problems
    pub affected: f64,
    /// Sum of all `*_problems_*` counters and `changed_constants`
    pub problems: u64,
    pub added: u64,
    pub removed: u64,
    /// Report location relative to the report directory
    pub report_path: String,
}

impl CompatibilityRecord {
    pub fn compatibility(&self) -> f64 {
        100.0 - self.affected
    }
}

/// How a mapping was established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchTier {
    Soname,
    Basename,
    ShortName,
    /// Single-survivor fallback: the only old object paired with the only new one
    SingleSurvivor,
}

/// Directional association of an old object with a new one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMapping {
    pub old: String,
    pub new: String,
    pub tier: MatchTier,
    /// (old, new) SONAME when both are known and differ
    pub soname_change: Option<(String, String)>,
}

impl ObjectMapping {
    /// The object file was renamed in a way no name-based tier detected
    pub fn is_rename(&self) -> bool {
        self.tier == MatchTier::SingleSurvivor
    }
}

/// Package-wide score of one check kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindScore {
    /// Full-precision compatibility percentage
    pub compatibility: f64,
    pub problems: u64,
}

impl KindScore {
    pub fn tier(&self) -> Tier {
        Tier::classify(self.compatibility, self.problems)
    }
}

/// Package-wide aggregate, recomputed every run
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateScore {
    pub binary: Option<KindScore>,
    pub source: Option<KindScore>,
    pub added_symbols: u64,
    pub removed_symbols: u64,
    pub objects_added: usize,
    pub objects_removed: usize,
    pub changed_soname: usize,
}

impl AggregateScore {
    pub fn get(&self, kind: CheckKind) -> Option<&KindScore> {
        match kind {
            CheckKind::Binary => self.binary.as_ref(),
            CheckKind::Source => self.source.as_ref(),
        }
    }
}

/// Presentation tier of a compatibility percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Ok,
    Warning,
    Incompatible,
}

impl Tier {
    /// 100% without problems is ok, 100% with problems or >= 90% is a
    /// warning, anything lower is incompatible.
    ///
    /// `rate` is taken at full precision, not the rounded display value, so
    /// 99.999 is a warning even though it prints as `100`.
    pub fn classify(rate: f64, problems: u64) -> Tier {
        if rate == 100.0 {
            if problems > 0 {
                Tier::Warning
            } else {
                Tier::Ok
            }
        } else if rate >= 90.0 {
            Tier::Warning
        } else {
            Tier::Incompatible
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Tier::Ok => "ok",
            Tier::Warning => "warning",
            Tier::Incompatible => "incompatible",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.css_class())
    }
}

/// Format a percentage for display: two decimals at most, trailing zeros stripped.
pub fn format_percent(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::classify(100.0, 0), Tier::Ok);
        assert_eq!(Tier::classify(100.0, 3), Tier::Warning);
        assert_eq!(Tier::classify(90.0, 0), Tier::Warning);
        assert_eq!(Tier::classify(95.0, 7), Tier::Warning);
        assert_eq!(Tier::classify(89.99, 0), Tier::Incompatible);
        assert_eq!(Tier::classify(0.0, 0), Tier::Incompatible);
    }

    #[test]
    fn test_tier_uses_unrounded_rate() {
        assert_eq!(format_percent(99.999), "100");
        assert_eq!(Tier::classify(99.999, 0), Tier::Warning);
        assert_eq!(format_percent(89.999), "90");
        assert_eq!(Tier::classify(89.999, 0), Tier::Incompatible);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(100.0), "100");
        assert_eq!(format_percent(95.0), "95");
        assert_eq!(format_percent(99.5), "99.5");
        assert_eq!(format_percent(99.25), "99.25");
        assert_eq!(format_percent(33.333333), "33.33");
        assert_eq!(format_percent(0.0), "0");
    }

    #[test]
    fn test_check_selection_defaults_to_both() {
        let sel = CheckSelection::from_flags(false, false);
        assert_eq!(sel.kinds(), vec![CheckKind::Binary, CheckKind::Source]);
        assert_eq!(sel.primary(), CheckKind::Binary);

        let src_only = CheckSelection::from_flags(false, true);
        assert_eq!(src_only.kinds(), vec![CheckKind::Source]);
        assert_eq!(src_only.primary(), CheckKind::Source);
    }

    #[test]
    fn test_package_format_from_path() {
        use std::path::Path;
        assert_eq!(
            PackageFormat::from_path(Path::new("/tmp/libfoo-1.0-1.x86_64.rpm")),
            Some(PackageFormat::Rpm)
        );
        assert_eq!(
            PackageFormat::from_path(Path::new("libfoo_1.0_amd64.deb")),
            Some(PackageFormat::Deb)
        );
        assert_eq!(PackageFormat::from_path(Path::new("libfoo.tar.gz")), None);
    }
}
