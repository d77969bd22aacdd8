use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths::expand_tilde;

pub const DEFAULT_PROBE_URL: &str = "https://www.google.com/generate_204";
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3000;
const MAX_PROBE_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// The game's personalbest.ini.
    pub source_file: PathBuf,
    /// Root of the website's git repository.
    pub repo_root: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub probe_url: Option<String>,
    #[serde(default)]
    pub probe_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub source_file: PathBuf,
    pub repo_root: PathBuf,
    pub probe_url: String,
    pub probe_timeout: Duration,
}

pub fn load_default_config() -> Result<ResolvedConfig> {
    let path = crate::paths::default_config_path()?;
    if !path.exists() {
        bail!(
            "config not found at {}\nRun `lap-updater init --source <file> --repo <dir>` to create one.",
            path.display()
        );
    }
    load_config(&path)
}

pub fn load_config(path: &Path) -> Result<ResolvedConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<ResolvedConfig> {
    let raw: Config = toml::from_str(contents).context("failed to parse config TOML")?;

    let source_file = expand_tilde(raw.paths.source_file.to_str().unwrap_or(""));
    let repo_root = expand_tilde(raw.paths.repo_root.to_str().unwrap_or(""));

    if source_file.as_os_str().is_empty() {
        bail!("paths.source_file must not be empty");
    }
    if repo_root.as_os_str().is_empty() {
        bail!("paths.repo_root must not be empty");
    }

    let probe_url = raw
        .network
        .probe_url
        .unwrap_or_else(|| DEFAULT_PROBE_URL.to_string());
    validate_probe_url(&probe_url)?;

    let timeout_ms = raw
        .network
        .probe_timeout_ms
        .unwrap_or(DEFAULT_PROBE_TIMEOUT_MS);
    validate_probe_timeout(timeout_ms)?;

    Ok(ResolvedConfig {
        source_file,
        repo_root,
        probe_url,
        probe_timeout: Duration::from_millis(timeout_ms),
    })
}

pub fn validate_probe_url(url: &str) -> Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("network.probe_url must be an http(s) URL, got {:?}", url);
    }
    Ok(())
}

/// The probe guards the workflow and must stay short; git itself is never timed out.
pub fn validate_probe_timeout(timeout_ms: u64) -> Result<()> {
    if timeout_ms == 0 || timeout_ms > MAX_PROBE_TIMEOUT_MS {
        bail!(
            "network.probe_timeout_ms must be between 1 and {}, got {}",
            MAX_PROBE_TIMEOUT_MS,
            timeout_ms
        );
    }
    Ok(())
}

pub fn write_config_atomic(path: &Path, config: &ResolvedConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "config already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }

    let raw = Config {
        paths: PathsConfig {
            source_file: config.source_file.clone(),
            repo_root: config.repo_root.clone(),
        },
        network: NetworkConfig {
            probe_url: Some(config.probe_url.clone()),
            probe_timeout_ms: Some(config.probe_timeout.as_millis() as u64),
        },
    };

    let content = toml::to_string_pretty(&raw).context("failed to serialize config")?;

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, &content)
        .with_context(|| format!("failed to write temp config to {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename config to {}", path.display()))?;

    Ok(())
}
