use crate::common::command::{repository_dir, run_pygit_command};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn manage_remote_table(repository_dir: TempDir) {
    let dir = repository_dir;
    run_pygit_command(dir.path(), &["init"]).assert().success();

    run_pygit_command(
        dir.path(),
        &["remote", "add", "origin", "pygit://localhost:9000/project"],
    )
    .assert()
    .success();

    run_pygit_command(dir.path(), &["remote", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("origin\tpygit://localhost:9000/project"));

    run_pygit_command(dir.path(), &["remote", "remove", "origin"])
        .assert()
        .success();

    run_pygit_command(dir.path(), &["remote", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("origin").not());
}

#[rstest]
fn rejects_malformed_urls(repository_dir: TempDir) {
    let dir = repository_dir;
    run_pygit_command(dir.path(), &["init"]).assert().success();

    run_pygit_command(dir.path(), &["remote", "add", "origin", "http://x/y"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("scheme"));
}

#[rstest]
fn removing_an_unknown_remote_fails(repository_dir: TempDir) {
    let dir = repository_dir;
    run_pygit_command(dir.path(), &["init"]).assert().success();

    run_pygit_command(dir.path(), &["remote", "remove", "nowhere"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}
