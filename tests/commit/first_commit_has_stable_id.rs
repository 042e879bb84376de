use crate::common::command::{
    pygit_commit_pinned, read_branch_tip, repository_dir, run_pygit_command,
};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;
use sha1::{Digest, Sha1};

/// With a pinned author and timestamp the whole object graph is reproducible:
/// `a.txt` = "hello\n", author `Alice <a@x>` at `1700000000 +0000`,
/// message "init".
const GOLDEN_BLOB: &str = "ce013625030ba8dba906f756967f9e9ca394464a";
const GOLDEN_TREE: &str = "2e81171448eb9f2ee3821e3d447aa6b2fe3ddba1";
const GOLDEN_COMMIT: &str = "ad08a1b8200df84c736bce2ae147b7df53a297dd";

#[rstest]
fn first_commit_has_stable_id(repository_dir: TempDir) {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("a.txt"),
        "hello\n".to_string(),
    ));
    run_pygit_command(repository_dir.path(), &["add", "a.txt"])
        .assert()
        .success();

    pygit_commit_pinned(repository_dir.path(), "init", "1700000000 +0000")
        .assert()
        .success();

    assert_eq!(read_branch_tip(repository_dir.path(), "master"), GOLDEN_COMMIT);

    // every object landed under its content address and rehashes to it
    for oid in [GOLDEN_BLOB, GOLDEN_TREE, GOLDEN_COMMIT] {
        let object_path = repository_dir
            .path()
            .join(".pygit")
            .join("objects")
            .join(&oid[..2])
            .join(&oid[2..]);
        let framed = std::fs::read(&object_path)
            .unwrap_or_else(|_| panic!("object {oid} missing from the store"));

        let mut hasher = Sha1::new();
        hasher.update(&framed);
        assert_eq!(format!("{:x}", hasher.finalize()), oid);
    }
}

#[rstest]
fn repeating_the_commit_in_a_fresh_repository_reproduces_the_id(repository_dir: TempDir) {
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
    pygit_commit_pinned(repository_dir.path(), "init", "1700000000 +0000")
        .assert()
        .success();

    assert_eq!(read_branch_tip(repository_dir.path(), "master"), GOLDEN_COMMIT);
}
