#![allow(dead_code)]

use crate::areas::repository::Repository;
use crate::artifacts::protocol::DEFAULT_PORT;
use crate::artifacts::protocol::client::DEFAULT_TIMEOUT_SECS;
use crate::errors::{EXIT_FAILURE, PygitError};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod areas;
mod artifacts;
mod commands;
mod errors;

#[derive(Parser)]
#[command(
    name = "pygit",
    version = "0.1.0",
    about = "A lightweight content-addressed version control engine",
    long_about = "Tracks snapshots of a working directory as immutable, \
    content-addressed objects organized into branch histories, and exchanges \
    them with peers over a minimal TCP protocol."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Initialize a new repository")]
    Init {
        #[arg(index = 1, help = "Directory to initialize (default: current)")]
        path: Option<String>,
    },
    #[command(about = "Stage files for the next commit")]
    Add {
        #[arg(required = true, help = "Files or directories to stage ('.' for everything)")]
        paths: Vec<String>,
    },
    #[command(about = "Record the staged snapshot on the current branch")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(about = "Show the working tree status")]
    Status,
    #[command(about = "Show commit history from HEAD")]
    Log {
        #[arg(index = 1, help = "Limit to the newest N commits")]
        count: Option<usize>,
    },
    #[command(about = "Create a branch, or list branches")]
    Branch {
        #[arg(index = 1, help = "Name of the branch to create")]
        name: Option<String>,
    },
    #[command(about = "Switch branches")]
    Checkout {
        #[arg(short = 'b', help = "Create the branch at the current HEAD first")]
        create: bool,
        #[arg(index = 1, help = "Branch to switch to")]
        target: String,
    },
    #[command(about = "Show changes as unified diffs")]
    Diff,
    #[command(about = "Manage named remotes")]
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },
    #[command(about = "Fast-forward a remote branch to the local tip")]
    Push {
        remote: String,
        branch: String,
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, help = "Per-request timeout, seconds")]
        timeout: u64,
    },
    #[command(about = "Fast-forward the local branch from a remote")]
    Pull {
        remote: String,
        branch: String,
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, help = "Per-request timeout, seconds")]
        timeout: u64,
    },
    #[command(about = "Copy a remote repository into a new directory")]
    Clone {
        url: String,
        directory: String,
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, help = "Per-request timeout, seconds")]
        timeout: u64,
    },
    #[command(about = "Serve repositories to pygit clients over TCP")]
    Serve {
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(index = 1, help = "Directory whose subdirectories are served (default: current)")]
        root: Option<String>,
    },
}

#[derive(Subcommand)]
enum RemoteCommands {
    #[command(about = "Add a remote")]
    Add { name: String, url: String },
    #[command(about = "Remove a remote")]
    Remove { name: String },
    #[command(about = "List remotes")]
    List,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("error: {error:#}");
        let code = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<PygitError>())
            .map(PygitError::exit_code)
            .unwrap_or(EXIT_FAILURE);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init { path } => {
            let root = match path {
                Some(path) => PathBuf::from(path),
                None => std::env::current_dir()?,
            };
            Repository::new(&root, Box::new(std::io::stdout()))?.init()
        }
        Commands::Clone {
            url,
            directory,
            timeout,
        } => {
            commands::porcelain::clone::clone(
                &url,
                Path::new(&directory),
                timeout,
                Box::new(std::io::stdout()),
            )
            .await
        }
        Commands::Serve { port, root } => {
            let root = match root {
                Some(root) => PathBuf::from(root),
                None => std::env::current_dir()?,
            };
            commands::porcelain::serve::serve(&root, port).await
        }
        command => {
            let repository =
                Repository::open(&std::env::current_dir()?, Box::new(std::io::stdout()))?;
            match command {
                Commands::Add { paths } => repository.add(&paths).await,
                Commands::Commit { message } => repository.commit(&message).await,
                Commands::Status => repository.status().await,
                Commands::Log { count } => repository.log(count),
                Commands::Branch { name } => repository.branch(name.as_deref()),
                Commands::Checkout { create, target } => {
                    repository.checkout(&target, create).await
                }
                Commands::Diff => repository.diff().await,
                Commands::Push {
                    remote,
                    branch,
                    timeout,
                } => repository.push(&remote, &branch, timeout).await,
                Commands::Pull {
                    remote,
                    branch,
                    timeout,
                } => repository.pull(&remote, &branch, timeout).await,
                Commands::Remote { command: remote } => match remote {
                    RemoteCommands::Add { name, url } => repository.remote_add(&name, &url),
                    RemoteCommands::Remove { name } => repository.remote_remove(&name),
                    RemoteCommands::List => repository.remote_list(),
                },
                Commands::Init { .. }
                | Commands::Clone { .. }
                | Commands::Serve { .. } => {
                    unreachable!("handled above")
                }
            }
        }
    }
}
