use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::{PublishOutcome, StateStore};

#[derive(Debug, Serialize)]
pub struct StatusResult {
    pub last_outcome: PublishOutcome,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub publish_pending: bool,
}

pub fn cmd_status(store: &impl StateStore) -> Result<StatusResult> {
    let state = store.load()?;
    Ok(StatusResult {
        last_outcome: store.load_last_outcome(),
        last_attempt_at: state.last_attempt_at,
        publish_pending: state.publish_pending,
    })
}

pub fn format_status_human(result: &StatusResult) -> String {
    let mut lines = Vec::new();
    let label = match result.last_outcome {
        PublishOutcome::Success => "Changes sent",
        PublishOutcome::Failure => "An error occurred!",
        PublishOutcome::None => "No publish attempts yet",
    };
    match result.last_attempt_at {
        Some(at) => lines.push(format!("{} ({})", label, at.format("%Y-%m-%d %H:%M UTC"))),
        None => lines.push(label.to_string()),
    }
    if result.publish_pending {
        lines.push("Changes are waiting: run `lap-updater publish`.".to_string());
    }
    lines.join("\n")
}
