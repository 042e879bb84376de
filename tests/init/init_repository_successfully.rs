use crate::common::command::{repository_dir, run_pygit_command};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn init_repository_successfully(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized empty repository"));

    let meta = repository_dir.path().join(".pygit");
    assert!(meta.join("objects").is_dir());
    assert!(meta.join("refs").join("heads").is_dir());
    assert!(meta.join("index").is_file());

    let head = std::fs::read_to_string(meta.join("HEAD")).unwrap();
    assert_eq!(head, "ref: master\n");
}

#[rstest]
fn init_twice_fails(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[rstest]
fn commands_outside_a_repository_fail(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["status"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not a pygit repository"));
}

#[rstest]
fn unknown_commands_are_usage_errors(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["frobnicate"])
        .assert()
        .failure()
        .code(2);
}
