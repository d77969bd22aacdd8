//! Failure modes that end a user action before or around the git workflow.
//!
//! Git itself failing is not an error here: a failed stage/commit/push is a
//! [`crate::publish::PublishReport`] with `success == false`, and the user
//! retries. These variants cover everything that stops the workflow from
//! starting or from reaching git at all.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(
        "source file not found: {}\nHint: select a valid personalbest.ini with `lap-updater init --source <file> --repo <dir> --force`",
        path.display()
    )]
    MissingSource { path: PathBuf },

    #[error(
        "repository root not found: {}\nHint: select a valid website repository with `lap-updater init --source <file> --repo <dir> --force`",
        path.display()
    )]
    MissingRepo { path: PathBuf },

    #[error("no internet connection ({reason})")]
    Connectivity { reason: String },

    #[error("failed to copy {} to {}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "another lap-updater workflow is already running\nHint: if no other run is active, remove {}",
        lock.display()
    )]
    Busy { lock: PathBuf },

    #[error("failed to take workflow lock at {}", path.display())]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no changes waiting to be published\nHint: run `lap-updater check` first, or pass --force")]
    NothingToPublish,
}
