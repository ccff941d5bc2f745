//! Minimum version checks for the ABI tools

use super::external::run_external_tool;
use crate::error::{AbidiffError, AbidiffResult};
use std::cmp::Ordering;

/// Oldest abi-compliance-checker that supports `-count-symbols` and `-component`
pub const ABI_CC_MIN_VERSION: &str = "1.99.24";
/// Oldest abi-dumper that supports `-search-debuginfo` and `-public-headers`
pub const ABI_DUMPER_MIN_VERSION: &str = "0.99.18";

/// Compare dotted numeric versions; missing components count as zero.
/// Non-numeric components compare as zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.trim()
            .split('.')
            .map(|p| {
                p.chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>()
                    .parse()
                    .unwrap_or(0)
            })
            .collect()
    };
    let (xa, xb) = (parse(a), parse(b));
    let len = xa.len().max(xb.len());
    for i in 0..len {
        let x = xa.get(i).copied().unwrap_or(0);
        let y = xb.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Ask a tool for its version with `-dumpversion`
pub fn dump_version(program: &str) -> AbidiffResult<String> {
    let cmd = vec![program.to_string(), "-dumpversion".to_string()];
    let result = run_external_tool(&cmd, program, 30, None);
    if !result.success {
        return Err(AbidiffError::ToolUnavailable {
            tool: program.to_string(),
            reason: result.describe_failure(),
        });
    }
    let version = result.stdout.trim().to_string();
    if version.is_empty() {
        return Err(AbidiffError::ToolUnavailable {
            tool: program.to_string(),
            reason: "empty -dumpversion output".to_string(),
        });
    }
    Ok(version)
}

/// Fail unless `program` reports at least `minimum`
pub fn require_version(program: &str, minimum: &str) -> AbidiffResult<String> {
    let found = dump_version(program)?;
    if compare_versions(&found, minimum) == Ordering::Less {
        return Err(AbidiffError::ToolTooOld {
            tool: program.to_string(),
            required: minimum.to_string(),
            found,
        });
    }
    Ok(found)
}
