//! Runner configuration
//!
//! Defaults follow the layout of a make-driven C++ test tree: sources live under `src/`, tests are named
//! `*_test.cpp`, and `make generate-tests` produces any auto-generated test sources.

use std::fmt;
use std::str::FromStr;

use crate::cli::test_interfaces::RunnerError;

/// Parallelism level forwarded to the build tool as `-j<N>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Jobs(u8);

impl Jobs {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 16;

    /// Validate a parallelism level.
    pub fn new(jobs: i64) -> Result<Self, RunnerError> {
        match u8::try_from(jobs) {
            Ok(n) if (Self::MIN..=Self::MAX).contains(&n) => Ok(Self(n)),
            _ => Err(RunnerError::BadJobs(jobs.to_string())),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The `-j<N>` flag handed to the build tool.
    pub fn as_flag(self) -> String {
        format!("-j{}", self.0)
    }
}

impl Default for Jobs {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl fmt::Display for Jobs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Jobs {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let jobs: i64 = s.trim().parse().map_err(|_| RunnerError::BadJobs(s.to_string()))?;
        Self::new(jobs)
    }
}

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Build tool program (looked up on `PATH` when it has no separator)
    pub make_program: String,
    /// Parallelism level forwarded to the build tool
    pub jobs: Jobs,
    /// Build target that generates auto-generated test sources
    pub generate_target: String,
    /// Source-root prefix stripped from target names
    pub source_root: String,
    /// Suffix identifying test-source files
    pub test_suffix: String,
    /// Print invocations instead of executing them
    pub dry_run: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            make_program: "make".to_string(),
            jobs: Jobs::default(),
            generate_target: "generate-tests".to_string(),
            source_root: "src/".to_string(),
            test_suffix: "_test.cpp".to_string(),
            dry_run: false,
        }
    }
}

impl RunnerConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the build tool program
    pub fn with_make_program(mut self, program: impl Into<String>) -> Self {
        self.make_program = program.into();
        self
    }

    /// Set the parallelism level
    pub fn with_jobs(mut self, jobs: Jobs) -> Self {
        self.jobs = jobs;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether a path names a test-source file
    pub fn is_test_source(&self, path: &str) -> bool {
        path.ends_with(&self.test_suffix)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_jobs_bounds() {
        assert_eq!(Jobs::new(1).unwrap().get(), 1);
        assert_eq!(Jobs::new(16).unwrap().get(), 16);
        assert!(Jobs::new(0).is_err());
        assert!(Jobs::new(17).is_err());
        assert!(Jobs::new(-3).is_err());
    }

    #[test]
    fn test_jobs_from_str() {
        assert_eq!("4".parse::<Jobs>().unwrap(), Jobs::new(4).unwrap());
        assert!(matches!("x".parse::<Jobs>(), Err(RunnerError::BadJobs(v)) if v == "x"));
        assert!(matches!("99".parse::<Jobs>(), Err(RunnerError::BadJobs(v)) if v == "99"));
        assert!("".parse::<Jobs>().is_err());
    }

    #[test]
    fn test_jobs_flag() {
        assert_eq!(Jobs::default().as_flag(), "-j1");
        assert_eq!(Jobs::new(8).unwrap().as_flag(), "-j8");
    }

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::new();
        assert_eq!(config.make_program, "make");
        assert_eq!(config.jobs.get(), 1);
        assert!(!config.dry_run);
        assert!(config.is_test_source("src/test/foo_test.cpp"));
        assert!(!config.is_test_source("src/test/foo.cpp"));
    }

    #[test]
    fn test_builder() {
        let config = RunnerConfig::new()
            .with_make_program("gmake")
            .with_jobs(Jobs::new(3).unwrap())
            .with_dry_run(true);
        assert_eq!(config.make_program, "gmake");
        assert_eq!(config.jobs.get(), 3);
        assert!(config.dry_run);
    }
}
