//! Test runner I/O boundary interfaces
//!
//! Every external step the runner takes (generate, build, run) is an [`Invocation`] handed to a
//! [`CommandExecutor`]. The default executor spawns the process and waits for it; the dry-run executor only
//! prints what would run. Tests substitute a recording executor.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use miette::Diagnostic;
use thiserror::Error;

/// Exit code for validation and spawn failures.
pub const INTERNAL_ERROR_CODE: i32 = -1;

/// Errors that stop a test run
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    #[error("bad value for -j flag: {0}")]
    #[diagnostic(code(runtests::bad_jobs), help("use -j<N> with N between 1 and 16"))]
    BadJobs(String),

    #[error("{}: no such file or directory", .0.display())]
    #[diagnostic(code(runtests::no_such_path))]
    NoSuchPath(PathBuf),

    #[error("{}: not a testfile", .path.display())]
    #[diagnostic(code(runtests::not_a_test_file), help("test files must end with `{suffix}`"))]
    NotATestFile { path: PathBuf, suffix: String },

    #[error("failed to walk test directory: {0}")]
    #[diagnostic(code(runtests::walk))]
    Walk(#[from] walkdir::Error),

    #[error("{command}: failed to start: {source}")]
    #[diagnostic(code(runtests::spawn))]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed (exit status {status})")]
    #[diagnostic(code(runtests::command_failed))]
    CommandFailed { command: String, status: i32 },
}

impl RunnerError {
    /// Process exit code this error terminates the run with.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunnerError::CommandFailed { status, .. } => *status,
            _ => INTERNAL_ERROR_CODE,
        }
    }
}

// ============================================================================
// Invocation
// ============================================================================

/// A program and its arguments, spawned without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

// ============================================================================
// Command Executor Interface
// ============================================================================

/// Run one external step to completion.
///
/// Returns `Ok(())` when the step succeeded. Any failure is fatal to the run.
pub trait CommandExecutor {
    fn execute(&self, invocation: &Invocation) -> Result<(), RunnerError>;
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for Box<E> {
    fn execute(&self, invocation: &Invocation) -> Result<(), RunnerError> {
        (**self).execute(invocation)
    }
}

/// Spawns the invocation and blocks until it exits.
pub struct ProcessExecutor;

impl CommandExecutor for ProcessExecutor {
    fn execute(&self, invocation: &Invocation) -> Result<(), RunnerError> {
        println!("execute command: {}", invocation);

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(|source| RunnerError::Spawn {
                command: invocation.to_string(),
                source,
            })?;

        tracing::debug!(command = %invocation, ?status, "command finished");

        match status_code(status) {
            Some(code) if code != 0 => Err(RunnerError::CommandFailed {
                command: invocation.to_string(),
                status: code,
            }),
            // No status at all counts as success
            _ => Ok(()),
        }
    }
}

/// Prints each invocation without running anything.
pub struct DryRunExecutor;

impl CommandExecutor for DryRunExecutor {
    fn execute(&self, invocation: &Invocation) -> Result<(), RunnerError> {
        println!("would execute: {}", invocation);
        Ok(())
    }
}

/// Exit status as an integer; signal deaths report the negated signal number.
fn status_code(status: ExitStatus) -> Option<i32> {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Some(-signal);
        }
    }
    status.code()
}
