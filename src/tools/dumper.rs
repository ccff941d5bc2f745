//! abi-dumper wrapper

use super::external::{append_log, run_external_tool};
use super::versions::{require_version, ABI_DUMPER_MIN_VERSION};
use super::{DescriptorExtractor, DumpRequest, ToolOutcome};
use crate::error::AbidiffResult;
use std::path::PathBuf;

/// Tuning options passed through to abi-dumper verbatim
#[derive(Debug, Clone, Default)]
pub struct DumperOptions {
    pub ignore_tags: Option<PathBuf>,
    pub keep_registers_and_offsets: bool,
    pub use_tu_dump: bool,
    pub include_preamble: Option<String>,
    pub include_paths: Option<String>,
}

pub struct AbiDumper {
    program: String,
    options: DumperOptions,
    timeout_secs: u64,
}

impl AbiDumper {
    pub fn new(program: &str, options: DumperOptions, timeout_secs: u64) -> Self {
        Self {
            program: program.to_string(),
            options,
            timeout_secs,
        }
    }

    /// Command line for one object.
    ///
    /// Include options only apply to translation-unit dumps; ignore-tags only
    /// applies without them.
    pub fn command(&self, request: &DumpRequest) -> Vec<String> {
        let mut cmd = vec![
            self.program.clone(),
            "-o".to_string(),
            request.output.to_string_lossy().to_string(),
            "-lver".to_string(),
            request.version.clone(),
            "-search-debuginfo".to_string(),
            request.debuginfo_dir.to_string_lossy().to_string(),
        ];

        if let Some(headers) = &request.headers_dir {
            cmd.push("-public-headers".to_string());
            cmd.push(headers.to_string_lossy().to_string());
        }

        let opts = &self.options;
        if opts.use_tu_dump {
            cmd.push("-use-tu-dump".to_string());
            if let Some(preamble) = &opts.include_preamble {
                cmd.push("-include-preamble".to_string());
                cmd.push(preamble.clone());
            }
            if let Some(paths) = &opts.include_paths {
                cmd.push("-include-paths".to_string());
                cmd.push(paths.clone());
            }
        } else if let Some(tags) = &opts.ignore_tags {
            cmd.push("-ignore-tags".to_string());
            cmd.push(tags.to_string_lossy().to_string());
        }

        if opts.keep_registers_and_offsets {
            cmd.push("-keep-registers-and-offsets".to_string());
        }

        cmd.push(request.object.to_string_lossy().to_string());
        cmd
    }
}

impl DescriptorExtractor for AbiDumper {
    fn check_version(&self) -> AbidiffResult<()> {
        require_version(&self.program, ABI_DUMPER_MIN_VERSION).map(|_| ())
    }

    fn dump(&self, request: &DumpRequest) -> ToolOutcome {
        let cmd = self.command(request);
        let result = run_external_tool(&cmd, "abi-dumper", self.timeout_secs, None);
        if let Some(log) = &request.log {
            append_log(log, "abi-dumper", &result);
        }
        ToolOutcome::from_artifact(&request.output, &result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: bool) -> DumpRequest {
        DumpRequest {
            object: PathBuf::from("/x/rel/usr/lib64/libfoo.so.1"),
            output: PathBuf::from("abi_dump/x86_64/libfoo/1.0/libfoo.so.1/ABI.dump"),
            version: "1.0".into(),
            debuginfo_dir: PathBuf::from("/x/debug"),
            headers_dir: headers.then(|| PathBuf::from("/x/devel")),
            log: None,
        }
    }

    #[test]
    fn test_basic_command() {
        let dumper = AbiDumper::new("abi-dumper", DumperOptions::default(), 0);
        let cmd = dumper.command(&request(false));
        assert_eq!(
            cmd,
            vec![
                "abi-dumper",
                "-o",
                "abi_dump/x86_64/libfoo/1.0/libfoo.so.1/ABI.dump",
                "-lver",
                "1.0",
                "-search-debuginfo",
                "/x/debug",
                "/x/rel/usr/lib64/libfoo.so.1",
            ]
        );
    }

    #[test]
    fn test_public_headers_and_ignore_tags() {
        let options = DumperOptions {
            ignore_tags: Some(PathBuf::from("tags.txt")),
            keep_registers_and_offsets: true,
            ..Default::default()
        };
        let cmd = AbiDumper::new("abi-dumper", options, 0).command(&request(true));
        let joined = cmd.join(" ");
        assert!(joined.contains("-public-headers /x/devel"));
        assert!(joined.contains("-ignore-tags tags.txt"));
        assert!(joined.contains("-keep-registers-and-offsets"));
        assert_eq!(cmd.last().map(String::as_str), Some("/x/rel/usr/lib64/libfoo.so.1"));
    }

    #[test]
    fn test_tu_dump_drops_ignore_tags() {
        let options = DumperOptions {
            ignore_tags: Some(PathBuf::from("tags.txt")),
            use_tu_dump: true,
            include_preamble: Some("config.h".into()),
            include_paths: Some("/usr/include/foo".into()),
            ..Default::default()
        };
        let joined = AbiDumper::new("abi-dumper", options, 0)
            .command(&request(true))
            .join(" ");
        assert!(joined.contains("-use-tu-dump -include-preamble config.h -include-paths /usr/include/foo"));
        assert!(!joined.contains("-ignore-tags"));
    }

    #[test]
    fn test_include_options_need_tu_dump() {
        let options = DumperOptions {
            include_preamble: Some("config.h".into()),
            ..Default::default()
        };
        let joined = AbiDumper::new("abi-dumper", options, 0)
            .command(&request(false))
            .join(" ");
        assert!(!joined.contains("-include-preamble"));
    }
}
