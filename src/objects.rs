//! Shared object naming rules
//!
//! Recognizes `lib*.so*` files, derives short names and reads SONAMEs out of
//! `objdump -p` output.

use regex::Regex;
use std::sync::OnceLock;

fn shared_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^lib.*\.so(\..+)?$").expect("valid regex"))
}

fn short_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+\.so)(\..+)?$").expect("valid regex"))
}

fn soname_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"SONAME\s+(\S+)").expect("valid regex"))
}

/// Whether a file name follows the `lib*.so[.*]` convention
pub fn is_shared_object(file_name: &str) -> bool {
    shared_re().is_match(file_name)
}

/// Strip the version suffix: `libfoo.so.1.2.3` -> `libfoo.so`
pub fn short_name(file_name: &str) -> Option<String> {
    short_name_re()
        .captures(file_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the SONAME from the dynamic section listing of `objdump -p`
pub fn parse_soname(objdump_output: &str) -> Option<String> {
    soname_re()
        .captures(objdump_output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end().to_string())
}

/// Whether a debuginfo package file carries separate debug symbols
pub fn is_debug_file(file_name: &str) -> bool {
    file_name.ends_with(".debug")
}

/// Case-insensitive ordering key used wherever objects are listed
pub fn sort_key(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_shared_object() {
        assert!(is_shared_object("libfoo.so"));
        assert!(is_shared_object("libfoo.so.1"));
        assert!(is_shared_object("libfoo.so.1.2.3"));
        assert!(is_shared_object("libfoo-2.0.so"));
        assert!(!is_shared_object("foo.so"));
        assert!(!is_shared_object("libfoo.a"));
        assert!(!is_shared_object("libfoo.sox"));
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("libfoo.so.1.2.3").as_deref(), Some("libfoo.so"));
        assert_eq!(short_name("libfoo.so").as_deref(), Some("libfoo.so"));
        assert_eq!(
            short_name("libfoo-1.2.so.0").as_deref(),
            Some("libfoo-1.2.so")
        );
        assert_eq!(short_name("libfoo.a"), None);
    }

    #[test]
    fn test_parse_soname() {
        let output = "\
Dynamic Section:
  NEEDED               libc.so.6
  SONAME               libfoo.so.1
  INIT                 0x0000000000001000
";
        assert_eq!(parse_soname(output).as_deref(), Some("libfoo.so.1"));
        assert_eq!(parse_soname("Dynamic Section:\n  NEEDED libc.so.6\n"), None);
    }
}
