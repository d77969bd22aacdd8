use anyhow::Result;
use serde::Serialize;

use crate::commands::{format_publish_report, summary_label};
use crate::connectivity::Reachability;
use crate::oplog::ObservationLog;
use crate::runner::ProcessRunner;
use crate::session::{Session, SyncReport};
use crate::state::StateStore;

#[derive(Debug, Serialize)]
pub struct SyncResult {
    #[serde(flatten)]
    pub report: SyncReport,
    pub log: ObservationLog,
}

impl SyncResult {
    pub fn failed(&self) -> bool {
        self.report.publish.as_ref().is_some_and(|p| !p.success)
    }
}

pub fn cmd_sync<R, P, S>(session: &mut Session<R, P, S>, mut log: ObservationLog) -> Result<SyncResult>
where
    R: ProcessRunner,
    P: Reachability,
    S: StateStore,
{
    let report = session.sync(&mut log)?;
    Ok(SyncResult { report, log })
}

pub fn format_sync_human(result: &SyncResult) -> String {
    let mut lines = vec![summary_label(result.report.check.summary).to_string()];
    if let Some(publish) = &result.report.publish {
        lines.push(format_publish_report(publish));
    }
    lines.join("\n")
}
