//! Error taxonomy surfaced to the command-line front-end
//!
//! Operations propagate `anyhow::Error` internally; failures that carry a
//! user-visible meaning wrap one of these variants so `main` can pick the
//! right message and exit code.

use thiserror::Error;

/// Exit code for user-visible failures (validation, non-fast-forward, ...)
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for internal and corruption errors
pub const EXIT_CORRUPTION: i32 = 3;

#[derive(Debug, Error)]
pub enum PygitError {
    #[error("not a pygit repository (missing .pygit directory)")]
    NotARepo,

    #[error("repository is locked by another process")]
    RepoLocked,

    #[error("object {0} not found")]
    ObjectMissing(String),

    #[error("object {expected} is corrupt (stored bytes hash to {actual})")]
    Corrupt { expected: String, actual: String },

    #[error("reference '{0}' not found")]
    RefNotFound(String),

    #[error("rejected: '{0}' is not a fast-forward")]
    NonFastForward(String),

    #[error("reference '{0}' was moved by another writer")]
    RefRaceLost(String),

    #[error("index is malformed: {0}")]
    IndexMalformed(String),

    #[error("your local changes would be overwritten by checkout:\n{0}")]
    DirtyWorkingTree(String),

    #[error("author identity missing: set PYGIT_AUTHOR_NAME and PYGIT_AUTHOR_EMAIL")]
    IdentityMissing,

    #[error("nothing staged to commit")]
    EmptyCommit,

    #[error("network error: {0}")]
    Network(String),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),
}

impl PygitError {
    /// Map an error kind to the process exit code contract:
    /// 1 for user-visible failures, 3 for corruption and protocol errors.
    /// (2 is reserved for usage errors and produced by the argument parser.)
    pub fn exit_code(&self) -> i32 {
        match self {
            PygitError::Corrupt { .. }
            | PygitError::ObjectMissing(_)
            | PygitError::IndexMalformed(_)
            | PygitError::ProtocolViolation(_) => EXIT_CORRUPTION,
            _ => EXIT_FAILURE,
        }
    }
}
