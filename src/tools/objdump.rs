//! SONAME lookup through `objdump -p`

use super::external::run_external_tool;
use super::ObjectInspector;
use crate::objects::parse_soname;
use std::path::Path;
use tracing::debug;

pub struct Objdump {
    program: String,
    timeout_secs: u64,
}

impl Objdump {
    pub fn new(program: &str, timeout_secs: u64) -> Self {
        Self {
            program: program.to_string(),
            timeout_secs,
        }
    }
}

impl ObjectInspector for Objdump {
    fn soname(&self, object: &Path) -> Option<String> {
        let cmd = vec![
            self.program.clone(),
            "-p".to_string(),
            object.to_string_lossy().to_string(),
        ];
        let result = run_external_tool(&cmd, "objdump", self.timeout_secs, None);
        if !result.exited_cleanly() {
            debug!(
                "Can't read SONAME of {}: {}",
                object.display(),
                result.describe_failure()
            );
            return None;
        }
        parse_soname(&result.stdout)
    }
}
