use crate::common::command::{repository_dir, run_pygit_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

/// `*.log` and `build/` are invisible to `add .` and `status`;
/// `build.log` matches `*.log`; `src/app.py` stays visible.
#[rstest]
fn add_respects_ignore_patterns(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join(".pygitignore"),
        "*.log\nbuild/\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("x.log"),
        "noise".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("build").join("out"),
        "artifact".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("build.log"),
        "more noise".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("src").join("app.py"),
        "print('hi')".to_string(),
    ));

    run_pygit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    let index = std::fs::read_to_string(repository_dir.path().join(".pygit").join("index")).unwrap();
    assert!(index.contains("src/app.py"));
    assert!(index.contains(".pygitignore"));
    assert!(!index.contains("x.log"));
    assert!(!index.contains("build.log"));
    assert!(!index.contains("build/out"));

    run_pygit_command(repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("x.log").not())
        .stdout(predicate::str::contains("build").not())
        .stdout(predicate::str::contains("src/app.py"));
}

#[rstest]
fn malformed_ignore_patterns_warn_but_do_not_fail(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join(".pygitignore"),
        "a/b\n*.log\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("kept.txt"),
        "kept".to_string(),
    ));

    run_pygit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("warning:"))
        .stdout(predicate::str::contains("added kept.txt"));
}
