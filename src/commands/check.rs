use anyhow::Result;
use serde::Serialize;

use crate::connectivity::Reachability;
use crate::detect::ChangeSummary;
use crate::oplog::ObservationLog;
use crate::runner::ProcessRunner;
use crate::session::{CheckReport, Session};
use crate::state::StateStore;

#[derive(Debug, Serialize)]
pub struct CheckResult {
    #[serde(flatten)]
    pub report: CheckReport,
    pub log: ObservationLog,
}

pub fn cmd_check<R, P, S>(
    session: &mut Session<R, P, S>,
    mut log: ObservationLog,
) -> Result<CheckResult>
where
    R: ProcessRunner,
    P: Reachability,
    S: StateStore,
{
    let report = session.check_changes(&mut log)?;
    Ok(CheckResult { report, log })
}

pub fn summary_label(summary: ChangeSummary) -> &'static str {
    match summary {
        ChangeSummary::NoChanges => "No changes",
        ChangeSummary::LocalChanges => "Changes found",
        ChangeSummary::PendingPush => "Commits pending push",
    }
}

pub fn format_check_human(result: &CheckResult) -> String {
    let mut lines = vec![summary_label(result.report.summary).to_string()];
    if result.report.has_changes {
        lines.push("Run `lap-updater publish` to send them.".to_string());
    }
    lines.join("\n")
}
