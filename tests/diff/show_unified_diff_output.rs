use crate::common::command::{pygit_commit, repository_dir, run_pygit_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

#[fixture]
fn committed_repository(repository_dir: TempDir) -> TempDir {
    let dir = repository_dir;
    run_pygit_command(dir.path(), &["init"]).assert().success();

    write_file(FileSpec::new(
        dir.path().join("nums.txt"),
        "one\ntwo\nthree\nfour\nfive\nsix\nseven\n".to_string(),
    ));
    run_pygit_command(dir.path(), &["add", "."]).assert().success();
    pygit_commit(dir.path(), "init").assert().success();

    dir
}

#[rstest]
fn show_unified_diff_output(committed_repository: TempDir) {
    let dir = committed_repository;

    // a different-length edit, so the (size, mtime) shortcut cannot mask it
    write_file(FileSpec::new(
        dir.path().join("nums.txt"),
        "one\ntwo\nthree\nFOUR!!\nfive\nsix\nseven\n".to_string(),
    ));

    let output = run_pygit_command(dir.path(), &["diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- a/nums.txt"))
        .stdout(predicate::str::contains("+++ b/nums.txt"))
        .stdout(predicate::str::contains("@@ -1,7 +1,7 @@"))
        .stdout(predicate::str::contains("-four"))
        .stdout(predicate::str::contains("+FOUR!!"))
        .get_output()
        .stdout
        .clone();

    // identical inputs produce byte-identical diffs
    let second = run_pygit_command(dir.path(), &["diff"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(output, second);
}

#[rstest]
fn staged_new_files_diff_against_nothing(committed_repository: TempDir) {
    let dir = committed_repository;

    write_file(FileSpec::new(
        dir.path().join("fresh.txt"),
        "brand new\n".to_string(),
    ));
    run_pygit_command(dir.path(), &["add", "fresh.txt"])
        .assert()
        .success();

    run_pygit_command(dir.path(), &["diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- /dev/null"))
        .stdout(predicate::str::contains("+++ b/fresh.txt"))
        .stdout(predicate::str::contains("+brand new"));
}

#[rstest]
fn binary_content_is_not_line_diffed(committed_repository: TempDir) {
    let dir = committed_repository;

    std::fs::write(dir.path().join("nums.txt"), b"\x00\x01\x02binary").unwrap();

    run_pygit_command(dir.path(), &["diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Binary files differ"));
}

#[rstest]
fn deleted_files_diff_to_dev_null(committed_repository: TempDir) {
    let dir = committed_repository;

    std::fs::remove_file(dir.path().join("nums.txt")).unwrap();

    run_pygit_command(dir.path(), &["diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- a/nums.txt"))
        .stdout(predicate::str::contains("+++ /dev/null"))
        .stdout(predicate::str::contains("-one"));
}
