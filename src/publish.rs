use serde::Serialize;
use std::path::Path;

use crate::oplog::ObservationLog;
use crate::runner::{run_git, CommandResult, ProcessRunner};
use crate::state::PublishOutcome;

pub const COMMIT_MESSAGE: &str = "Updated: Laptime";

const NOOP_COMMIT_MARKER: &str = "nothing to commit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStep {
    Stage,
    Commit,
    Push,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: PublishStep,
    pub exit_code: i32,
    pub succeeded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub success: bool,
    pub outcome: PublishOutcome,
    /// The commit step found nothing new and only existing history was pushed.
    pub noop_commit: bool,
    pub steps: Vec<StepReport>,
}

impl PublishReport {
    /// After a failure the publish action stays offered so the user can retry;
    /// after a success it is withdrawn until a new check finds changes.
    pub fn publish_available(&self) -> bool {
        !self.success
    }
}

/// True when git refused to commit only because the tree already matches HEAD.
///
/// This reads git's English message, so it is the one place to change if a
/// locale-independent signal is ever used instead.
pub fn is_noop_commit(result: &CommandResult) -> bool {
    result.exit_code != 0
        && (contains_ignore_case(&result.stdout, NOOP_COMMIT_MARKER)
            || contains_ignore_case(&result.stderr, NOOP_COMMIT_MARKER))
}

pub fn commit_succeeded(result: &CommandResult) -> bool {
    result.success() || is_noop_commit(result)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Stages everything, commits with the fixed message, and pushes. All three
/// steps run in order regardless of earlier results; success needs each one.
pub fn publish(
    runner: &dyn ProcessRunner,
    working_dir: &Path,
    log: &mut ObservationLog,
) -> PublishReport {
    log.note("Running git add .");
    let add = run_git(runner, working_dir, &["add", "."]);
    log.record(&add);

    log.note("Running git commit...");
    let commit = run_git(runner, working_dir, &["commit", "-m", COMMIT_MESSAGE]);
    log.record(&commit);
    let noop_commit = is_noop_commit(&commit);
    if noop_commit {
        log::info!("nothing new to commit; pushing existing history");
    }

    log.note("Running git push...");
    let push = run_git(runner, working_dir, &["push"]);
    log.record(&push);

    let steps = vec![
        StepReport {
            step: PublishStep::Stage,
            exit_code: add.exit_code,
            succeeded: add.success(),
        },
        StepReport {
            step: PublishStep::Commit,
            exit_code: commit.exit_code,
            succeeded: commit_succeeded(&commit),
        },
        StepReport {
            step: PublishStep::Push,
            exit_code: push.exit_code,
            succeeded: push.success(),
        },
    ];

    let success = steps.iter().all(|s| s.succeeded);
    let outcome = if success {
        PublishOutcome::Success
    } else {
        PublishOutcome::Failure
    };

    if !success {
        let failed: Vec<String> = steps
            .iter()
            .filter(|s| !s.succeeded)
            .map(|s| format!("{:?} (exit {})", s.step, s.exit_code))
            .collect();
        log::warn!("publish failed at: {}", failed.join(", "));
    }

    PublishReport {
        success,
        outcome,
        noop_commit,
        steps,
    }
}
