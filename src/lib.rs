#![forbid(unsafe_code)]
//! runtests: discover, build, and run C++ unit tests
//!
//! Walks the given files and directories for `*_test.cpp` sources, asks `make` to generate and build the
//! matching test executables, then runs each executable. The first failure of any step stops the whole run.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod naming;
pub mod version;

pub use cli::test_interfaces::{CommandExecutor, DryRunExecutor, Invocation, ProcessExecutor, RunnerError};
pub use cli::test_runner::TestRunner;
pub use config::{Jobs, RunnerConfig};
pub use discovery::{TestBatch, discover_test_batches};
pub use naming::{Platform, TargetNaming};
