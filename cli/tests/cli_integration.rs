//! End-to-end CLI behavior: exit codes and artifact truncation, driven
//! through the actual binary rather than the library surface.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn quadc() -> Command {
    Command::cargo_bin("quadc").unwrap()
}

#[test]
fn valid_program_exits_zero_and_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prog.qd");
    fs::write(&input, "const int x := 3 + 4;\n").unwrap();

    quadc().arg(&input).assert().success();

    assert!(fs::read_to_string(dir.path().join("prog.sym")).unwrap().contains("Id. Name"));
    assert!(!fs::read_to_string(dir.path().join("prog.quad")).unwrap().is_empty());
}

#[test]
fn semantic_error_exits_one_and_truncates_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prog.qd");
    fs::write(
        &input,
        "func f(int x, int y) : int begin return x + y; end f(1, 2, 3);\n",
    )
    .unwrap();

    quadc().arg(&input).assert().failure().code(1).stderr(predicate::str::contains("SEM-E"));

    assert!(fs::read_to_string(dir.path().join("prog.sym")).unwrap().is_empty());
    assert!(fs::read_to_string(dir.path().join("prog.quad")).unwrap().is_empty());
}

#[test]
fn missing_input_file_fails_without_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("does_not_exist.qd");

    quadc().arg(&input).assert().failure();
}
