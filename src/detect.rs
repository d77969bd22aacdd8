use serde::Serialize;
use std::path::Path;

use crate::oplog::ObservationLog;
use crate::runner::{run_git, ProcessRunner};

const FETCH_ARGS: &[&str] = &["fetch", "--quiet"];
const STATUS_ARGS: &[&str] = &["status", "-sb"];

/// Classification of one `git status -sb` report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryState {
    /// Any entry beyond the branch summary line.
    pub has_uncommitted_changes: bool,
    /// The branch summary line says the branch is ahead of its upstream.
    pub is_ahead_of_remote: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSummary {
    NoChanges,
    LocalChanges,
    PendingPush,
}

impl RepositoryState {
    pub fn from_status_output(output: &str) -> Self {
        let lines: Vec<&str> = output.lines().filter(|line| !line.is_empty()).collect();

        // The "ahead" token is git's English wording; other locales are not recognised.
        let is_ahead_of_remote = lines
            .first()
            .is_some_and(|summary| summary.to_lowercase().contains("ahead"));

        Self {
            has_uncommitted_changes: lines.len() > 1,
            is_ahead_of_remote,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.has_uncommitted_changes || self.is_ahead_of_remote
    }

    pub fn summary(&self) -> ChangeSummary {
        if self.has_uncommitted_changes {
            ChangeSummary::LocalChanges
        } else if self.is_ahead_of_remote {
            ChangeSummary::PendingPush
        } else {
            ChangeSummary::NoChanges
        }
    }
}

/// Fetches, then reads short status. The fetch only refreshes remote-tracking
/// refs; its outcome is logged and never stops the status read.
pub fn detect(
    runner: &dyn ProcessRunner,
    working_dir: &Path,
    log: &mut ObservationLog,
) -> RepositoryState {
    log.note("Running git fetch (compare with remote)...");
    let fetch = run_git(runner, working_dir, FETCH_ARGS);
    log.record(&fetch);
    if !fetch.success() {
        log::warn!(
            "git fetch exited with {}; comparing against the last known remote state",
            fetch.exit_code
        );
    }

    log.note("Running git status...");
    let status = run_git(runner, working_dir, STATUS_ARGS);
    log.record(&status);

    RepositoryState::from_status_output(&status.stdout)
}
