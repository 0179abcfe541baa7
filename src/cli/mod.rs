//! CLI module for runtests
//!
//! ## Usage
//!
//! - `runtests <path>...` - generate, build, and run the tests under each path
//! - `runtests -j<N> <path>...` - same, forwarding `-j<N>` (1-16) to make
//!
//! With no paths the usage text is printed and the process exits successfully.
//!
//! ## Modules
//!
//! - `test_runner` - Generate/build/run passes
//! - `test_interfaces` - Process execution boundary and runner errors
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod test_interfaces;
pub mod test_runner;

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use miette::Diagnostic;

use crate::config::{Jobs, RunnerConfig};
use crate::version::RUNTESTS_VERSION;

use test_interfaces::{CommandExecutor, DryRunExecutor, INTERNAL_ERROR_CODE, ProcessExecutor, RunnerError};
use test_runner::TestRunner;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// Usage and validation errors.
    pub const USAGE: ExitCode = ExitCode(INTERNAL_ERROR_CODE);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a usage error (exit code -1).
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::USAGE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<RunnerError> for CliError {
    fn from(err: RunnerError) -> Self {
        let mut message = err.to_string();
        if let Some(help) = err.help() {
            message.push_str(&format!("\nhelp: {}", help));
        }
        Self::new(message, ExitCode(err.exit_code()))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

const USAGE: &str = "runtests <path/test/dir(/files)>...\n       runtests -j<#cores> <path/test/dir(/files)>...";

/// Build and run C++ unit tests through make
#[derive(Parser, Debug)]
#[command(name = "runtests")]
#[command(version = RUNTESTS_VERSION)]
#[command(about = "Generate, build, and run *_test.cpp unit tests through make", long_about = None)]
#[command(override_usage = USAGE)]
pub struct Cli {
    /// Parallel jobs forwarded to make (1-16)
    #[arg(short = 'j', long = "jobs", value_name = "N", default_value = "1", value_parser = parse_jobs)]
    pub jobs: Jobs,

    /// Build tool to invoke
    #[arg(long = "make", value_name = "PROGRAM", default_value = "make")]
    pub make: String,

    /// Print commands instead of executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Test files or directories to build and run
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

impl Cli {
    /// Runner configuration described by the parsed flags.
    pub fn config(&self) -> RunnerConfig {
        RunnerConfig::new()
            .with_make_program(self.make.clone())
            .with_jobs(self.jobs)
            .with_dry_run(self.dry_run)
    }
}

fn parse_jobs(value: &str) -> Result<Jobs, RunnerError> {
    value.parse()
}

/// What the command line asks for.
#[derive(Debug)]
pub enum ParsedArgs {
    /// Build and run the given paths
    Run(Cli),
    /// Print text (usage, help, version) and exit successfully
    Print(String),
}

/// Parse the command line (including the program name).
///
/// Options are only recognised before the first path; every argument from the first path on is a path,
/// even one that starts with `-`. Zero paths, or a lone `-j` flag, show usage and succeed. Bad flags are
/// usage errors (exit -1).
pub fn parse_args<I, T>(args: I) -> CliResult<ParsedArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    let lone_jobs_flag = args.len() == 2 && args[1].to_string_lossy().starts_with("-j");
    if args.len() < 2 || lone_jobs_flag {
        return Ok(ParsedArgs::Print(usage_text()));
    }

    let cli = match Cli::try_parse_from(with_path_separator(args)) {
        Ok(cli) => cli,
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(ParsedArgs::Print(err.render().to_string())),
                _ => Err(CliError::usage(err.render().to_string().trim_end())),
            };
        }
    };

    if cli.paths.is_empty() {
        return Ok(ParsedArgs::Print(usage_text()));
    }

    Ok(ParsedArgs::Run(cli))
}

/// Insert `--` in front of the first path so clap never reads a path as an option.
fn with_path_separator(args: Vec<OsString>) -> Vec<OsString> {
    let mut args = args.into_iter();
    let mut out: Vec<OsString> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        let (is_separator, is_option, takes_value) = {
            let text = arg.to_string_lossy();
            let takes_value = matches!(text.as_ref(), "-j" | "--jobs" | "--make");
            let is_option = takes_value
                || text.starts_with("-j")
                || text.starts_with("--jobs=")
                || text.starts_with("--make=")
                || matches!(text.as_ref(), "--dry-run" | "-h" | "--help" | "-V" | "--version");
            (text == "--", is_option, takes_value)
        };
        if is_separator || !is_option {
            out.push(OsString::from("--"));
            if !is_separator {
                out.push(arg);
            }
            out.extend(args);
            return out;
        }

        out.push(arg);
        if takes_value {
            out.extend(args.next());
        }
    }

    out
}

fn usage_text() -> String {
    Cli::command().render_help().to_string()
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    match execute(env::args_os()) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Parse `args` and perform the requested run.
pub fn execute<I, T>(args: I) -> CliResult<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match parse_args(args)? {
        ParsedArgs::Run(cli) => cli,
        ParsedArgs::Print(text) => {
            print!("{}", text);
            return Ok(ExitCode::SUCCESS);
        }
    };

    let config = cli.config();
    tracing::debug!(?config, paths = cli.paths.len(), "starting test run");

    let executor: Box<dyn CommandExecutor> = if config.dry_run {
        Box::new(DryRunExecutor)
    } else {
        Box::new(ProcessExecutor)
    };

    TestRunner::new(config, executor).run(&cli.paths)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Tests
// ============================================================================
