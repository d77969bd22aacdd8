use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const STATE_FILENAME: &str = "state.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishOutcome {
    #[default]
    None,
    Success,
    Failure,
}

/// What survives between runs: the last publish outcome and whether there is
/// something detected but not yet published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub last_outcome: PublishOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub publish_pending: bool,
}

pub trait StateStore {
    fn load(&self) -> Result<AppState>;
    fn save(&mut self, state: &AppState) -> Result<()>;

    fn load_last_outcome(&self) -> PublishOutcome {
        self.load().map(|s| s.last_outcome).unwrap_or_default()
    }

    fn save_last_outcome(&mut self, outcome: PublishOutcome) -> Result<()> {
        let mut state = self.load().unwrap_or_default();
        state.last_outcome = outcome;
        self.save(&state)
    }
}

#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STATE_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    /// A missing file is a first run. A file that no longer parses is
    /// replaced by defaults on the next save rather than blocking the user.
    fn load(&self) -> Result<AppState> {
        if !self.path.exists() {
            return Ok(AppState::default());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read state from {}", self.path.display()))?;
        match toml::from_str(&contents) {
            Ok(state) => Ok(state),
            Err(e) => {
                log::warn!(
                    "ignoring unreadable state file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(AppState::default())
            }
        }
    }

    fn save(&mut self, state: &AppState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create state directory {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(state).context("failed to serialize state")?;

        let tmp_path = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write temp state to {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to rename state to {}", self.path.display()))?;

        Ok(())
    }
}
