mod pull_fast_forwards_local;
mod push_fast_forward_rules;

use crate::common::command::{pygit_commit, run_pygit_command};
use crate::common::file::{FileSpec, write_file};
use crate::common::server::ServerGuard;
use assert_fs::TempDir;
use std::path::Path;

/// A served root containing one repository (`project`) with a single commit,
/// plus the running server.
pub fn served_project() -> (TempDir, ServerGuard) {
    let root = TempDir::new().expect("Failed to create temp dir");
    let project = root.path().join("project");

    run_pygit_command(root.path(), &["init", "project"])
        .assert()
        .success();
    write_file(FileSpec::new(project.join("a.txt"), "hello\n".to_string()));
    run_pygit_command(&project, &["add", "."]).assert().success();
    pygit_commit(&project, "c1").assert().success();

    let server = ServerGuard::start(root.path());
    (root, server)
}

pub fn server_tip(root: &Path) -> String {
    crate::common::command::read_branch_tip(&root.join("project"), "master")
}

/// Clone `project` from the server into a fresh directory
pub fn clone_project(server: &ServerGuard) -> TempDir {
    let workdir = TempDir::new().expect("Failed to create temp dir");
    let target = workdir.path().join("clone");

    let mut cmd = assert_cmd::Command::cargo_bin("pygit").expect("Failed to find pygit binary");
    cmd.current_dir(workdir.path())
        .arg("clone")
        .arg(server.url("project"))
        .arg(&target);
    cmd.assert().success();

    workdir
}

pub fn commit_change(dir: &Path, content: &str, message: &str) {
    write_file(FileSpec::new(dir.join("a.txt"), content.to_string()));
    run_pygit_command(dir, &["add", "."]).assert().success();
    pygit_commit(dir, message).assert().success();
}
