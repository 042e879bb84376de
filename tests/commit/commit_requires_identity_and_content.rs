use crate::common::command::{pygit_commit, repository_dir, run_pygit_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn committing_an_empty_index_fails(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    pygit_commit(repository_dir.path(), "nothing here")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nothing staged"));
}

#[rstest]
fn committing_without_identity_fails(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("a.txt"),
        "hello\n".to_string(),
    ));
    run_pygit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    let mut commit = run_pygit_command(repository_dir.path(), &["commit", "-m", "who am i"]);
    commit.env_remove("PYGIT_AUTHOR_NAME");
    commit.env_remove("PYGIT_AUTHOR_EMAIL");
    commit
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("PYGIT_AUTHOR_NAME"));
}

/// The staging index keeps its entries after a commit; re-adding updates in
/// place and the next commit chains onto the first.
#[rstest]
fn index_persists_across_commits(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("a.txt"),
        "hello\n".to_string(),
    ));
    run_pygit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();
    pygit_commit(repository_dir.path(), "first")
        .assert()
        .success();

    let index_path = repository_dir.path().join(".pygit").join("index");
    let index = std::fs::read_to_string(&index_path).unwrap();
    assert!(index.contains("a.txt"), "index was cleared by commit");

    // an unchanged index commits the same tree again on top
    pygit_commit(repository_dir.path(), "second")
        .assert()
        .success();

    let log = run_pygit_command(repository_dir.path(), &["log"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let log = String::from_utf8(log).unwrap();
    assert_eq!(log.matches("commit ").count(), 2);
}
