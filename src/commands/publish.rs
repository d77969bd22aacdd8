use anyhow::Result;
use serde::Serialize;

use crate::connectivity::Reachability;
use crate::oplog::ObservationLog;
use crate::publish::{PublishReport, PublishStep};
use crate::runner::ProcessRunner;
use crate::session::Session;
use crate::state::StateStore;

#[derive(Debug, Serialize)]
pub struct PublishResult {
    #[serde(flatten)]
    pub report: PublishReport,
    pub log: ObservationLog,
}

pub fn cmd_publish<R, P, S>(
    session: &mut Session<R, P, S>,
    mut log: ObservationLog,
    force: bool,
) -> Result<PublishResult>
where
    R: ProcessRunner,
    P: Reachability,
    S: StateStore,
{
    let report = session.update(&mut log, force)?;
    Ok(PublishResult { report, log })
}

fn step_name(step: PublishStep) -> &'static str {
    match step {
        PublishStep::Stage => "git add",
        PublishStep::Commit => "git commit",
        PublishStep::Push => "git push",
    }
}

pub fn format_publish_report(report: &PublishReport) -> String {
    if report.success {
        return if report.noop_commit {
            "Changes sent (no new commit; pushed existing history)".to_string()
        } else {
            "Changes sent".to_string()
        };
    }

    let mut lines = vec!["An error occurred!".to_string()];
    for step in report.steps.iter().filter(|s| !s.succeeded) {
        lines.push(format!(
            "  {} failed (exit code {})",
            step_name(step.step),
            step.exit_code
        ));
    }
    lines.push("Run `lap-updater publish` to retry.".to_string());
    lines.join("\n")
}

pub fn format_publish_human(result: &PublishResult) -> String {
    format_publish_report(&result.report)
}
