//! Subprocess plumbing shared by every external tool wrapper
//!
//! All tools (package managers, objdump, abi-dumper, abi-compliance-checker)
//! are run through [`run_external_tool`], which never panics and reports
//! spawn failures, non-zero exits and timeouts as data.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

/// Result from running an external tool
#[derive(Debug, Clone)]
pub struct ExternalToolResult {
    /// Whether the process could be run to completion
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub return_code: Option<i32>,
    pub timed_out: bool,
    /// Error message if the process could not be run
    pub error: Option<String>,
}

impl ExternalToolResult {
    pub fn success(stdout: String, stderr: String, return_code: i32) -> Self {
        Self {
            success: true,
            stdout,
            stderr,
            return_code: Some(return_code),
            timed_out: false,
            error: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            return_code: None,
            timed_out: false,
            error: Some(error),
        }
    }

    pub fn timeout(tool_name: &str, timeout_secs: u64) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            return_code: None,
            timed_out: true,
            error: Some(format!("{} timed out after {}s", tool_name, timeout_secs)),
        }
    }

    /// Ran to completion with exit status 0
    pub fn exited_cleanly(&self) -> bool {
        self.success && self.return_code == Some(0)
    }

    /// One-line description of what went wrong, for warnings
    pub fn describe_failure(&self) -> String {
        if let Some(err) = &self.error {
            return err.clone();
        }
        let stderr = self.stderr.trim();
        match (self.return_code, stderr.is_empty()) {
            (Some(code), true) => format!("exit code {}", code),
            (Some(code), false) => format!("exit code {}: {}", code, last_line(stderr)),
            (None, _) => "terminated by signal".to_string(),
        }
    }
}

fn last_line(s: &str) -> &str {
    s.lines().last().unwrap_or(s)
}

/// Run an external tool with standard error handling
///
/// # Arguments
/// * `cmd` - Command and arguments to run
/// * `tool_name` - Human-readable tool name for error messages
/// * `timeout_secs` - Timeout in seconds (0 = no timeout)
/// * `cwd` - Working directory for the tool
pub fn run_external_tool(
    cmd: &[String],
    tool_name: &str,
    timeout_secs: u64,
    cwd: Option<&Path>,
) -> ExternalToolResult {
    if cmd.is_empty() {
        return ExternalToolResult::failure("Empty command".to_string());
    }

    let program = &cmd[0];
    let args = &cmd[1..];

    debug!("Running {}: {} {:?}", tool_name, program, args);

    let mut command = Command::new(program);
    command.args(args);

    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                return ExternalToolResult::failure(format!(
                    "{} not found. Please install it first.",
                    tool_name
                ));
            }
            return ExternalToolResult::failure(format!("Failed to run {}: {}", tool_name, e));
        }
    };

    if timeout_secs > 0 {
        run_with_timeout(child, tool_name, timeout_secs)
    } else {
        run_without_timeout(child, tool_name)
    }
}

fn run_without_timeout(child: std::process::Child, tool_name: &str) -> ExternalToolResult {
    let output = match child.wait_with_output() {
        Ok(output) => output,
        Err(e) => {
            return ExternalToolResult::failure(format!("Failed to wait for {}: {}", tool_name, e));
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let return_code = output.status.code().unwrap_or(-1);

    ExternalToolResult::success(stdout, stderr, return_code)
}

/// Poll for completion, killing the process once the deadline passes.
/// Pipes are drained on helper threads so a chatty tool cannot block on a full pipe.
fn run_with_timeout(
    mut child: std::process::Child,
    tool_name: &str,
    timeout_secs: u64,
) -> ExternalToolResult {
    use std::thread;
    use std::time::Instant;

    let start = Instant::now();
    let timeout = Duration::from_secs(timeout_secs);

    let stdout_reader = child.stdout.take().map(|mut s| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = s.read_to_end(&mut buf);
            buf
        })
    });
    let stderr_reader = child.stderr.take().map(|mut s| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = s.read_to_end(&mut buf);
            buf
        })
    });

    let collect = |handle: Option<thread::JoinHandle<Vec<u8>>>| {
        handle
            .and_then(|h| h.join().ok())
            .map(|buf| String::from_utf8_lossy(&buf).to_string())
            .unwrap_or_default()
    };

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stdout = collect(stdout_reader);
                let stderr = collect(stderr_reader);
                return ExternalToolResult::success(stdout, stderr, status.code().unwrap_or(-1));
            }
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!("{} timed out after {}s", tool_name, timeout_secs);
                    return ExternalToolResult::timeout(tool_name, timeout_secs);
                }
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                return ExternalToolResult::failure(format!(
                    "Failed to wait for {}: {}",
                    tool_name, e
                ));
            }
        }
    }
}

/// Locate a program the way a shell would: paths are taken as given,
/// bare names are searched in `PATH`.
pub fn find_tool(tool: &str) -> Option<PathBuf> {
    let candidate = Path::new(tool);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(tool))
        .find(|p| p.is_file())
}

/// Check if a tool is installed
pub fn is_tool_installed(tool: &str) -> bool {
    find_tool(tool).is_some()
}

/// Append a tool's stdout to the run log. Failures to log are not fatal.
pub fn append_log(log: &Path, tool_name: &str, result: &ExternalToolResult) {
    use std::io::Write;

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log);
    match file {
        Ok(mut f) => {
            let _ = writeln!(f, "== {}", tool_name);
            let _ = f.write_all(result.stdout.as_bytes());
            if !result.stderr.is_empty() {
                let _ = f.write_all(result.stderr.as_bytes());
            }
        }
        Err(e) => debug!("Could not write tool log {}: {}", log.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_tool_result() {
        let result = ExternalToolResult::success("output".into(), "".into(), 0);
        assert!(result.success);
        assert!(result.exited_cleanly());
        assert_eq!(result.stdout, "output");

        let result = ExternalToolResult::failure("error".into());
        assert!(!result.success);
        assert_eq!(result.error, Some("error".into()));
        assert_eq!(result.describe_failure(), "error");

        let result = ExternalToolResult::timeout("test", 60);
        assert!(result.timed_out);
    }

    #[test]
    fn test_describe_failure_uses_last_stderr_line() {
        let result =
            ExternalToolResult::success(String::new(), "warning: x\nERROR: boom\n".into(), 2);
        assert!(!result.exited_cleanly());
        assert_eq!(result.describe_failure(), "exit code 2: ERROR: boom");
    }

    #[test]
    fn test_empty_command() {
        let result = run_external_tool(&[], "nothing", 0, None);
        assert!(!result.success);
    }

    #[test]
    fn test_missing_program() {
        let cmd = vec!["pkg-abidiff-no-such-program-xyz".to_string()];
        let result = run_external_tool(&cmd, "ghost", 0, None);
        assert!(!result.success);
        assert!(result.error.unwrap_or_default().contains("not found"));
    }

    #[test]
    fn test_find_tool() {
        assert!(!is_tool_installed("pkg-abidiff-no-such-program-xyz"));
        assert!(find_tool("/no/such/dir/tool").is_none());

        let dir = tempfile::TempDir::new().unwrap();
        let tool = dir.path().join("fake-tool");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        assert_eq!(find_tool(tool.to_str().unwrap()), Some(tool));
    }
}
