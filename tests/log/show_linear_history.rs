use crate::common::command::{pygit_commit, read_log_ids, repository_dir, run_pygit_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn show_linear_history(repository_dir: TempDir) {
    let dir = repository_dir;
    run_pygit_command(dir.path(), &["init"]).assert().success();

    for n in 1..=3 {
        write_file(FileSpec::new(
            dir.path().join("a.txt"),
            format!("revision {n}\n"),
        ));
        run_pygit_command(dir.path(), &["add", "."]).assert().success();
        pygit_commit(dir.path(), &format!("commit {n}"))
            .assert()
            .success();
    }

    let all = read_log_ids(dir.path(), &[]);
    assert_eq!(all.len(), 3);

    // newest first
    run_pygit_command(dir.path(), &["log", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("commit 3"))
        .stdout(predicate::str::contains("commit 2").not());

    let limited = read_log_ids(dir.path(), &["2"]);
    assert_eq!(limited, all[..2].to_vec());
}

#[rstest]
fn empty_repository_logs_gracefully(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_pygit_command(repository_dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no commits yet"));
}
