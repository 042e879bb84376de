use crate::common::command::{repository_dir, run_pygit_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn add_stages_nested_files(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    run_pygit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("added 1.txt"))
        .stdout(predicate::str::contains("added a/b/3.txt"));

    let index = std::fs::read_to_string(repository_dir.path().join(".pygit").join("index")).unwrap();
    let staged: Vec<&str> = index
        .lines()
        .map(|line| line.split('\t').nth(1).unwrap())
        .collect();
    assert_eq!(staged, vec!["1.txt", "a/b/3.txt"]);
}

#[rstest]
fn adding_a_missing_never_staged_path_reports_it(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_pygit_command(repository_dir.path(), &["add", "ghost.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("path not found: ghost.txt"));
}

#[rstest]
fn adding_a_deleted_staged_path_unstages_it(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("doomed.txt"),
        "soon gone".to_string(),
    ));
    run_pygit_command(repository_dir.path(), &["add", "doomed.txt"])
        .assert()
        .success();

    std::fs::remove_file(repository_dir.path().join("doomed.txt")).unwrap();
    run_pygit_command(repository_dir.path(), &["add", "doomed.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed doomed.txt"));

    let index = std::fs::read_to_string(repository_dir.path().join(".pygit").join("index")).unwrap();
    assert_eq!(index, "");
}
