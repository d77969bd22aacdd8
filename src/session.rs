use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;

use crate::busy::BusyGuard;
use crate::config::ResolvedConfig;
use crate::connectivity::Reachability;
use crate::detect::{detect, ChangeSummary, RepositoryState};
use crate::error::WorkflowError;
use crate::oplog::ObservationLog;
use crate::publish::{publish, PublishReport};
use crate::runner::ProcessRunner;
use crate::staging::{copy_source_into_repo, ensure_paths, TARGET_FILENAME};
use crate::state::{AppState, StateStore};

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub copied_to: PathBuf,
    pub state: RepositoryState,
    pub has_changes: bool,
    pub summary: ChangeSummary,
}

#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub check: CheckReport,
    /// Absent when the check found nothing to send.
    pub publish: Option<PublishReport>,
}

/// One user's workflow against one website repository: preconditions,
/// connectivity, copy, detection, and publishing, with the collaborators
/// injected so that each piece can be swapped in tests.
pub struct Session<R, P, S> {
    config: ResolvedConfig,
    runner: R,
    probe: P,
    store: S,
    lock_path: PathBuf,
}

impl<R, P, S> Session<R, P, S>
where
    R: ProcessRunner,
    P: Reachability,
    S: StateStore,
{
    pub fn new(config: ResolvedConfig, runner: R, probe: P, store: S, lock_path: PathBuf) -> Self {
        Self {
            config,
            runner,
            probe,
            store,
            lock_path,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the last check found changes that have not been sent yet.
    pub fn can_publish(&self) -> bool {
        self.load_state().publish_pending
    }

    pub fn check_changes(&mut self, log: &mut ObservationLog) -> Result<CheckReport, WorkflowError> {
        let _busy = BusyGuard::acquire(&self.lock_path)?;
        self.ensure_ready()?;
        self.run_check(log)
    }

    /// Publishes detected changes. Without `force`, refuses when no check has
    /// found anything since the last successful publish.
    pub fn update(
        &mut self,
        log: &mut ObservationLog,
        force: bool,
    ) -> Result<PublishReport, WorkflowError> {
        let _busy = BusyGuard::acquire(&self.lock_path)?;
        self.ensure_ready()?;
        if !force && !self.can_publish() {
            return Err(WorkflowError::NothingToPublish);
        }
        Ok(self.run_publish(log))
    }

    /// Publishes when this call's own check found changes. The persisted
    /// pending flag is not consulted.
    pub fn sync(&mut self, log: &mut ObservationLog) -> Result<SyncReport, WorkflowError> {
        let _busy = BusyGuard::acquire(&self.lock_path)?;
        self.ensure_ready()?;
        let check = self.run_check(log)?;
        let publish = check.has_changes.then(|| self.run_publish(log));
        Ok(SyncReport { check, publish })
    }

    /// Preconditions and connectivity, once per user action.
    fn ensure_ready(&self) -> Result<(), WorkflowError> {
        ensure_paths(&self.config.source_file, &self.config.repo_root)?;
        self.probe.check()
    }

    fn run_check(&mut self, log: &mut ObservationLog) -> Result<CheckReport, WorkflowError> {
        let copied_to = copy_source_into_repo(&self.config.source_file, &self.config.repo_root)?;
        log.note(format!(
            "Copied {} to {}",
            TARGET_FILENAME,
            copied_to.display()
        ));

        let state = detect(&self.runner, &self.config.repo_root, log);
        let summary = state.summary();
        match summary {
            ChangeSummary::NoChanges => log.note("No changes detected (local + remote)."),
            ChangeSummary::PendingPush => {
                log.note("Local branch is ahead of remote: push required.")
            }
            ChangeSummary::LocalChanges => {}
        }

        let has_changes = state.has_changes();
        self.persist(|s| s.publish_pending = has_changes);

        Ok(CheckReport {
            copied_to,
            state,
            has_changes,
            summary,
        })
    }

    fn run_publish(&mut self, log: &mut ObservationLog) -> PublishReport {
        let report = publish(&self.runner, &self.config.repo_root, log);
        self.persist(|s| {
            s.last_attempt_at = Some(Utc::now());
            s.publish_pending = report.publish_available();
        });
        if let Err(e) = self.store.save_last_outcome(report.outcome) {
            log::warn!("failed to save publish outcome: {:#}", e);
        }
        report
    }

    fn load_state(&self) -> AppState {
        match self.store.load() {
            Ok(state) => state,
            Err(e) => {
                log::warn!("failed to load publish state: {:#}", e);
                AppState::default()
            }
        }
    }

    /// State is advisory: a failed save is logged and the workflow result stands.
    fn persist(&mut self, update: impl FnOnce(&mut AppState)) {
        let mut state = self.load_state();
        update(&mut state);
        if let Err(e) = self.store.save(&state) {
            log::warn!("failed to save publish state: {:#}", e);
        }
    }
}
