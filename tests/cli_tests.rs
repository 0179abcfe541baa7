//! End-to-end tests for the runtests binary
//!
//! A shell script stands in for make and records its arguments; test executables are shell scripts that
//! record that they ran.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// `process::exit(-1)` as seen by the parent on Unix
const USAGE_EXIT: i32 = 255;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: tempfile::tempdir().expect("tempdir"),
        };
        let log = ws.path().join("make.log");
        ws.script("fake-make", &format!("echo \"$*\" >> '{}'", log.display()));
        ws
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn make(&self) -> PathBuf {
        self.path().join("fake-make")
    }

    fn touch(&self, rel: &str) {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, "").expect("write");
    }

    fn script(&self, rel: &str, body: &str) {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    }

    /// Test executable that appends `name` to run.log and exits with `code`
    fn test_exe(&self, rel: &str, name: &str, code: i32) {
        let log = self.path().join("run.log");
        self.script(rel, &format!("echo {name} >> '{}'\nexit {code}", log.display()));
    }

    fn log(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).unwrap_or_default()
    }

    fn run(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        let make = self.make();
        cargo_bin_cmd!("runtests")
            .current_dir(self.path())
            .env("RUST_LOG", "warn")
            .arg("--make")
            .arg(make)
            .args(args)
            .assert()
    }
}

fn stderr(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}

fn stdout(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

#[test]
fn no_arguments_prints_usage_and_succeeds() {
    let assert = cargo_bin_cmd!("runtests").assert().success();
    let out = stdout(&assert);
    assert!(out.contains("-j<#cores>"), "usage missing: {out}");
}

#[test]
fn lone_jobs_flag_prints_usage_and_succeeds() {
    let assert = cargo_bin_cmd!("runtests").arg("-j4").assert().success();
    assert!(stdout(&assert).contains("Usage"));
}

#[test]
fn single_test_file_is_generated_built_and_run() {
    let ws = Workspace::new();
    ws.touch("foo_test.cpp");
    ws.test_exe("foo", "foo", 0);

    ws.run(&["foo_test.cpp"]).success();

    assert_eq!(ws.log("make.log"), "-j1 generate-tests -s\n-j1 foo\n");
    assert_eq!(ws.log("run.log"), "foo\n");
}

#[test]
fn directory_is_built_in_one_batch_and_run_in_order() {
    let ws = Workspace::new();
    ws.touch("tests/a_test.cpp");
    ws.touch("tests/b_test.cpp");
    ws.touch("tests/readme.md");
    ws.test_exe("tests/a", "a", 0);
    ws.test_exe("tests/b", "b", 0);

    let assert = ws.run(&["-j4", "tests"]).success();

    assert_eq!(ws.log("make.log"), "-j4 generate-tests -s\n-j4 tests/a tests/b\n");
    assert_eq!(ws.log("run.log"), "a\nb\n");
    assert!(stdout(&assert).contains("execute command: tests/a"));
}

#[test]
fn source_root_is_stripped_from_targets() {
    let ws = Workspace::new();
    ws.touch("src/test/unit/x_test.cpp");
    ws.test_exe("test/unit/x", "x", 0);

    ws.run(&["src/test/unit/x_test.cpp"]).success();

    assert_eq!(ws.log("make.log"), "-j1 generate-tests -s\n-j1 test/unit/x\n");
    assert_eq!(ws.log("run.log"), "x\n");
}

#[test]
fn missing_path_fails_before_build() {
    let ws = Workspace::new();

    let assert = ws.run(&["missing_test.cpp"]).code(USAGE_EXIT);

    assert!(stderr(&assert).contains("missing_test.cpp: no such file or directory"));
    assert_eq!(ws.log("make.log"), "-j1 generate-tests -s\n");
}

#[test]
fn jobs_flag_after_a_path_is_treated_as_a_path() {
    let ws = Workspace::new();
    ws.touch("foo_test.cpp");
    ws.test_exe("foo", "foo", 0);

    let assert = ws.run(&["foo_test.cpp", "-j4"]).code(USAGE_EXIT);

    assert!(stderr(&assert).contains("-j4: no such file or directory"));
    assert_eq!(ws.log("make.log"), "-j1 generate-tests -s\n-j1 foo\n");
    assert_eq!(ws.log("run.log"), "");
}

#[test]
fn hyphenated_path_fails_after_generate() {
    let ws = Workspace::new();

    let assert = ws.run(&["-weird_test.cpp"]).code(USAGE_EXIT);

    assert!(stderr(&assert).contains("-weird_test.cpp: no such file or directory"));
    assert_eq!(ws.log("make.log"), "-j1 generate-tests -s\n");
}

#[test]
fn non_test_file_is_rejected() {
    let ws = Workspace::new();
    ws.touch("helper.cpp");

    let assert = ws.run(&["helper.cpp"]).code(USAGE_EXIT);

    assert!(stderr(&assert).contains("helper.cpp: not a testfile"));
}

#[test]
fn bad_jobs_flag_fails_before_any_step() {
    let ws = Workspace::new();
    ws.touch("tests/a_test.cpp");

    let assert = ws.run(&["-j99", "tests"]).code(USAGE_EXIT);

    assert!(stderr(&assert).contains("bad value for -j flag"));
    assert_eq!(ws.log("make.log"), "");
}

#[test]
fn failing_test_aborts_with_its_status() {
    let ws = Workspace::new();
    ws.touch("tests/a_test.cpp");
    ws.touch("tests/b_test.cpp");
    ws.test_exe("tests/a", "a", 3);
    ws.test_exe("tests/b", "b", 0);

    let assert = ws.run(&["tests"]).code(3);

    assert_eq!(ws.log("run.log"), "a\n");
    assert!(stderr(&assert).contains("tests/a failed (exit status 3)"));
}

#[test]
fn failing_build_aborts_before_running() {
    let ws = Workspace::new();
    ws.script("fake-make", "case \"$*\" in *generate-tests*) exit 0 ;; esac\nexit 2");
    ws.touch("a_test.cpp");
    ws.test_exe("a", "a", 0);

    ws.run(&["a_test.cpp"]).code(2);

    assert_eq!(ws.log("run.log"), "");
}

#[test]
fn dry_run_executes_nothing() {
    let ws = Workspace::new();
    ws.touch("tests/a_test.cpp");

    let assert = ws.run(&["--dry-run", "tests"]).success();

    assert_eq!(ws.log("make.log"), "");
    assert!(stdout(&assert).contains("would execute:"));
}
