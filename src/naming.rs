//! Build-target naming
//!
//! Test sources map to make targets by dropping the source root and the test suffix:
//! `src/test/unit/foo_test.cpp` becomes `test/unit/foo`. Windows-class platforms additionally build
//! `test/unit/foo.exe` and always spell targets with forward slashes.

use std::path::{MAIN_SEPARATOR_STR, PathBuf};

use crate::config::RunnerConfig;

const EXE_SUFFIX: &str = ".exe";

/// Platform family relevant to target naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    /// Detect the platform this binary runs on.
    pub fn current() -> Self {
        Self::from_identifiers(&[std::env::consts::OS, std::env::consts::FAMILY])
    }

    /// Windows-class if any identifier starts with "windows" (case-insensitive).
    pub fn from_identifiers(identifiers: &[&str]) -> Self {
        if identifiers.iter().any(|id| id.to_ascii_lowercase().starts_with("windows")) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn is_windows(self) -> bool {
        self == Platform::Windows
    }
}

/// Target naming convention for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetNaming {
    platform: Platform,
    source_root: String,
    test_suffix: String,
}

impl TargetNaming {
    pub fn new(platform: Platform, config: &RunnerConfig) -> Self {
        Self {
            platform,
            source_root: config.source_root.clone(),
            test_suffix: config.test_suffix.clone(),
        }
    }

    /// Translate a test-source path into a make target.
    ///
    /// Strips the source root once and the test suffix once. Input matching neither is returned unchanged.
    pub fn target_name(&self, name: &str) -> String {
        let name = name.strip_prefix(self.source_root.as_str()).unwrap_or(name);
        match name.strip_suffix(self.test_suffix.as_str()) {
            Some(stem) if self.platform.is_windows() => format!("{stem}{EXE_SUFFIX}").replace('\\', "/"),
            Some(stem) => stem.to_string(),
            None => name.to_string(),
        }
    }

    /// Path of the executable built for a target.
    ///
    /// Single-component targets are anchored at `.` so the executable is not looked up on `PATH`.
    pub fn executable_path(&self, target: &str) -> PathBuf {
        let native = target.replace('/', MAIN_SEPARATOR_STR);
        let path = PathBuf::from(native);
        if path.components().count() == 1 && path.is_relative() {
            PathBuf::from(".").join(path)
        } else {
            path
        }
    }
}
