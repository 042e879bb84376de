use super::{clone_project, commit_change, served_project, server_tip};
use crate::common::command::{read_branch_tip, run_pygit_command};
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;

/// Fast-forward safety: the first pusher wins, the stale pusher is rejected
/// and the remote tip is left untouched.
#[test]
fn push_fast_forward_rules() {
    let (root, server) = served_project();

    let workdir_a = clone_project(&server);
    let clone_a = workdir_a.path().join("clone");
    let workdir_b = clone_project(&server);
    let clone_b = workdir_b.path().join("clone");

    // A advances and pushes: accepted
    commit_change(&clone_a, "hello from a\n", "c2");
    run_pygit_command(&clone_a, &["push", "origin", "master"])
        .assert()
        .success();

    let pushed_tip = read_branch_tip(&clone_a, "master");
    assert_eq!(server_tip(root.path()), pushed_tip);

    // B diverges from the old tip and pushes: rejected, tip unchanged
    commit_change(&clone_b, "hello from b\n", "c2-prime");
    run_pygit_command(&clone_b, &["push", "origin", "master"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("fast-forward"));

    assert_eq!(server_tip(root.path()), pushed_tip);
}

#[test]
fn pushing_an_unchanged_branch_is_a_noop() {
    let (_root, server) = served_project();
    let workdir = clone_project(&server);
    let clone = workdir.path().join("clone");

    run_pygit_command(&clone, &["push", "origin", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn push_to_an_unreachable_remote_fails_cleanly() {
    let (_root, server) = served_project();
    let workdir = clone_project(&server);
    let clone = workdir.path().join("clone");
    drop(server); // nobody listens anymore

    commit_change(&clone, "stranded\n", "c2");
    run_pygit_command(&clone, &["push", "origin", "master"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
}
