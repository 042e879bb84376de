use super::{clone_project, commit_change, served_project};
use crate::common::command::{read_branch_tip, read_log_ids, run_pygit_command};
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;

/// After A pushes, B's pull fast-forwards the local ref and refreshes the
/// checked-out working tree.
#[test]
fn pull_fast_forwards_local() {
    let (_root, server) = served_project();

    let workdir_a = clone_project(&server);
    let clone_a = workdir_a.path().join("clone");
    let workdir_b = clone_project(&server);
    let clone_b = workdir_b.path().join("clone");

    commit_change(&clone_a, "fresh content\n", "c2");
    run_pygit_command(&clone_a, &["push", "origin", "master"])
        .assert()
        .success();

    run_pygit_command(&clone_b, &["pull", "origin", "master"])
        .assert()
        .success();

    assert_eq!(
        read_branch_tip(&clone_b, "master"),
        read_branch_tip(&clone_a, "master")
    );
    assert_eq!(read_log_ids(&clone_b, &[]), read_log_ids(&clone_a, &[]));
    assert_eq!(
        std::fs::read_to_string(clone_b.join("a.txt")).unwrap(),
        "fresh content\n"
    );
}

#[test]
fn pulling_when_current_is_a_noop() {
    let (_root, server) = served_project();
    let workdir = clone_project(&server);
    let clone = workdir.path().join("clone");

    run_pygit_command(&clone, &["pull", "origin", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already up to date"));
}

/// A local-only commit makes the pull non-fast-forward; it must fail loudly
/// and move nothing.
#[test]
fn diverged_pull_fails_loudly() {
    let (_root, server) = served_project();

    let workdir_a = clone_project(&server);
    let clone_a = workdir_a.path().join("clone");
    let workdir_b = clone_project(&server);
    let clone_b = workdir_b.path().join("clone");

    commit_change(&clone_a, "server side\n", "c2");
    run_pygit_command(&clone_a, &["push", "origin", "master"])
        .assert()
        .success();

    commit_change(&clone_b, "local side\n", "c2-prime");
    let local_tip = read_branch_tip(&clone_b, "master");

    run_pygit_command(&clone_b, &["pull", "origin", "master"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("fast-forward"));

    assert_eq!(read_branch_tip(&clone_b, "master"), local_tip);
    assert_eq!(
        std::fs::read_to_string(clone_b.join("a.txt")).unwrap(),
        "local side\n"
    );
}
