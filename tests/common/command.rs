use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use derive_new::new;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository with three committed files (one at the root, two nested)
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_pygit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    let file1 = FileSpec::new(repository_dir.path().join("1.txt"), "one".to_string());
    write_file(file1);

    let file2 = FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    );
    write_file(file2);

    let file3 = FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    );
    write_file(file3);

    run_pygit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    pygit_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_pygit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("pygit").expect("Failed to find pygit binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

#[derive(Debug, Clone, new)]
pub struct RandomAuthor {
    pub name: String,
    pub email: String,
}

pub fn generate_random_author() -> RandomAuthor {
    use fake::Fake;
    use fake::faker::internet::en::FreeEmail;
    use fake::faker::name::en::Name;

    let name = Name().fake::<String>().replace(" ", "_");
    let email = FreeEmail().fake::<String>();
    RandomAuthor::new(name, email)
}

pub fn pygit_commit(dir: &Path, message: &str) -> Command {
    let author = generate_random_author();
    let mut cmd = run_pygit_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("PYGIT_AUTHOR_NAME", &author.name),
        ("PYGIT_AUTHOR_EMAIL", &author.email),
    ]);
    cmd
}

/// Commit with a pinned identity and timestamp so ids are reproducible
pub fn pygit_commit_pinned(dir: &Path, message: &str, timestamp: &str) -> Command {
    let mut cmd = run_pygit_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("PYGIT_AUTHOR_NAME", "Alice"),
        ("PYGIT_AUTHOR_EMAIL", "a@x"),
        ("PYGIT_AUTHOR_DATE", timestamp),
    ]);
    cmd
}

/// The commit id a branch points at
pub fn read_branch_tip(dir: &Path, branch: &str) -> String {
    let tip_path = dir
        .join(".pygit")
        .join("refs")
        .join("heads")
        .join(branch);
    std::fs::read_to_string(tip_path)
        .expect("Failed to read branch tip")
        .trim()
        .to_string()
}

/// Commit ids from `log`, newest first
pub fn read_log_ids(dir: &Path, args: &[&str]) -> Vec<String> {
    let mut log_args = vec!["log"];
    log_args.extend_from_slice(args);

    let output = run_pygit_command(dir, &log_args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    String::from_utf8(output)
        .expect("log output is not utf-8")
        .lines()
        .filter_map(|line| line.strip_prefix("commit ").map(str::to_string))
        .collect()
}
