//! Common test utilities

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Scratch directory for config files written by a test
pub struct TestEnvironment {
    pub config_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let config_dir = TempDir::new().expect("Failed to create temp dir");
        Self { config_dir }
    }

    /// Write `contents` as an ssh config file and return its path
    pub fn write_ssh_config(&self, contents: &str) -> PathBuf {
        let path = self.config_dir.path().join("config");
        fs::write(&path, contents).expect("Failed to write ssh config");
        path
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
