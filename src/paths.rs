use anyhow::{Context, Result};
use std::path::PathBuf;

pub const APP_NAME: &str = "lap-updater";
pub const CONFIG_ENV: &str = "LAP_UPDATER_CONFIG";
pub const STATE_DIR_ENV: &str = "LAP_UPDATER_STATE_DIR";

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    } else if path == "~" {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home);
        }
    }
    PathBuf::from(path)
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .context("could not determine a home directory for lap-updater")
}

pub fn default_config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Where the persisted publish status and the workflow lock live. Platforms
/// without a state directory fall back to the local data directory.
pub fn default_state_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(STATE_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let proj = project_dirs()?;
    Ok(proj
        .state_dir()
        .unwrap_or_else(|| proj.data_local_dir())
        .to_path_buf())
}
