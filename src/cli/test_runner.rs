//! Test runner implementation
//!
//! A run has three passes, each finishing before the next starts:
//!
//! 1. **Generate**: `make -j<N> generate-tests -s`, once per run.
//! 2. **Build**: every path argument is checked and built. A single test file is one `make` call; a
//!    directory is one `make` call per sub-directory that holds tests.
//! 3. **Run**: every built executable is started in the order it was discovered.
//!
//! The first failing step ends the run. Nothing is retried and no summary is collected.

use std::path::Path;

use crate::config::RunnerConfig;
use crate::discovery::discover_test_batches;
use crate::naming::{Platform, TargetNaming};

use super::test_interfaces::{CommandExecutor, Invocation, RunnerError};

/// Drives generate, build, and run passes through a [`CommandExecutor`].
pub struct TestRunner<E> {
    config: RunnerConfig,
    naming: TargetNaming,
    executor: E,
}

impl<E: CommandExecutor> TestRunner<E> {
    /// Runner with naming for the current platform.
    pub fn new(config: RunnerConfig, executor: E) -> Self {
        let naming = TargetNaming::new(Platform::current(), &config);
        Self {
            config,
            naming,
            executor,
        }
    }

    /// Override the target naming convention.
    pub fn with_naming(mut self, naming: TargetNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Generate, build, then run the tests named by `paths`.
    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> Result<(), RunnerError> {
        self.generate_tests()?;

        for path in paths {
            self.build_path(path.as_ref())?;
        }

        for path in paths {
            self.run_path(path.as_ref())?;
        }

        Ok(())
    }

    /// Pass 0: generate auto-generated test sources.
    #[tracing::instrument(skip_all, fields(jobs = %self.config.jobs))]
    pub fn generate_tests(&self) -> Result<(), RunnerError> {
        let invocation = self.make_invocation().args([self.config.generate_target.as_str(), "-s"]);
        self.executor.execute(&invocation)
    }

    /// Pass 1: validate one path argument and build its targets.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn build_path(&self, path: &Path) -> Result<(), RunnerError> {
        if !path.exists() {
            return Err(RunnerError::NoSuchPath(path.to_path_buf()));
        }

        if !path.is_dir() {
            let name = path.to_string_lossy();
            if !self.config.is_test_source(&name) {
                return Err(RunnerError::NotATestFile {
                    path: path.to_path_buf(),
                    suffix: self.config.test_suffix.clone(),
                });
            }
            tracing::info!("make single test: {}", path.display());
            return self.build_targets(vec![self.naming.target_name(&name)]);
        }

        for batch in discover_test_batches(path, &self.config.test_suffix)? {
            tracing::info!("make root: {}", batch.dir.display());
            let targets = batch
                .files
                .iter()
                .map(|file| self.naming.target_name(&file.to_string_lossy()))
                .collect();
            self.build_targets(targets)?;
        }

        Ok(())
    }

    /// Pass 2: run every test executable built for one path argument.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn run_path(&self, path: &Path) -> Result<(), RunnerError> {
        if !path.is_dir() {
            tracing::info!("run single test: {}", path.display());
            return self.run_test(&path.to_string_lossy());
        }

        for batch in discover_test_batches(path, &self.config.test_suffix)? {
            for file in &batch.files {
                tracing::info!("run dir,test: {},{}", batch.dir.display(), file.display());
                self.run_test(&file.to_string_lossy())?;
            }
        }

        Ok(())
    }

    fn build_targets(&self, targets: Vec<String>) -> Result<(), RunnerError> {
        if targets.is_empty() {
            return Ok(());
        }
        let invocation = self.make_invocation().args(targets);
        self.executor.execute(&invocation)
    }

    fn run_test(&self, source: &str) -> Result<(), RunnerError> {
        let target = self.naming.target_name(source);
        let invocation = Invocation::new(self.naming.executable_path(&target));
        self.executor.execute(&invocation)
    }

    fn make_invocation(&self) -> Invocation {
        Invocation::new(&self.config.make_program).arg(self.config.jobs.as_flag())
    }
}
