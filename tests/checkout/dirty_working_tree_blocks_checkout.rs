use crate::common::command::{pygit_commit, repository_dir, run_pygit_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

/// Two branches that disagree about `a.txt`
#[fixture]
fn diverging_repository(repository_dir: TempDir) -> TempDir {
    let dir = repository_dir;
    run_pygit_command(dir.path(), &["init"]).assert().success();

    write_file(FileSpec::new(dir.path().join("a.txt"), "hello\n".to_string()));
    run_pygit_command(dir.path(), &["add", "."]).assert().success();
    pygit_commit(dir.path(), "init").assert().success();

    run_pygit_command(dir.path(), &["branch", "base"])
        .assert()
        .success();

    write_file(FileSpec::new(dir.path().join("a.txt"), "hi\n".to_string()));
    run_pygit_command(dir.path(), &["add", "."]).assert().success();
    pygit_commit(dir.path(), "edit").assert().success();

    dir
}

#[rstest]
fn dirty_working_tree_blocks_checkout(diverging_repository: TempDir) {
    let dir = diverging_repository;

    // uncommitted edit to a path the two branches disagree about
    write_file(FileSpec::new(
        dir.path().join("a.txt"),
        "precious local work\n".to_string(),
    ));

    run_pygit_command(dir.path(), &["checkout", "base"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("local changes"))
        .stderr(predicate::str::contains("a.txt"));

    // nothing moved
    assert_eq!(
        std::fs::read_to_string(dir.path().join("a.txt")).unwrap(),
        "precious local work\n"
    );
    let head = std::fs::read_to_string(dir.path().join(".pygit").join("HEAD")).unwrap();
    assert_eq!(head, "ref: master\n");
}

#[rstest]
fn untracked_files_on_unrelated_paths_do_not_block(diverging_repository: TempDir) {
    let dir = diverging_repository;

    write_file(FileSpec::new(
        dir.path().join("notes.txt"),
        "scratch\n".to_string(),
    ));

    run_pygit_command(dir.path(), &["checkout", "base"])
        .assert()
        .success();

    assert_eq!(
        std::fs::read_to_string(dir.path().join("a.txt")).unwrap(),
        "hello\n"
    );
    assert!(dir.path().join("notes.txt").exists());
}
