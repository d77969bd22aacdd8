use anyhow::{bail, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{validate_probe_timeout, validate_probe_url, ResolvedConfig};
use crate::paths::expand_tilde;
use crate::runner::{run_git, SystemRunner};

pub struct InitInputs {
    pub source_file: String,
    pub repo_root: String,
    pub probe_url: String,
    pub probe_timeout_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct InitResult {
    pub config_path: PathBuf,
    pub source_file: PathBuf,
    pub repo_root: PathBuf,
}

pub fn validate_init_inputs(inputs: &InitInputs) -> Result<ResolvedConfig> {
    let source_file = expand_tilde(&inputs.source_file);
    if !source_file.is_file() {
        bail!(
            "source file does not exist: {}\nHint: point --source at the game's personalbest.ini",
            source_file.display()
        );
    }

    let repo_root = expand_tilde(&inputs.repo_root);
    if !repo_root.is_dir() {
        bail!(
            "repo path does not exist: {}\nHint: provide the root folder of your website repository",
            repo_root.display()
        );
    }

    let git_check = run_git(&SystemRunner, &repo_root, &["rev-parse", "--git-dir"]);
    if !git_check.success() {
        bail!(
            "not a git repository: {}\nHint: provide the root folder of your website repository",
            repo_root.display()
        );
    }

    validate_probe_url(&inputs.probe_url)?;
    validate_probe_timeout(inputs.probe_timeout_ms)?;

    Ok(ResolvedConfig {
        source_file,
        repo_root,
        probe_url: inputs.probe_url.clone(),
        probe_timeout: Duration::from_millis(inputs.probe_timeout_ms),
    })
}

pub fn cmd_init(inputs: InitInputs, config_path: &Path, force: bool) -> Result<InitResult> {
    let config = validate_init_inputs(&inputs)?;
    crate::config::write_config_atomic(config_path, &config, force)?;

    Ok(InitResult {
        config_path: config_path.to_path_buf(),
        source_file: config.source_file,
        repo_root: config.repo_root,
    })
}

pub fn format_init_human(result: &InitResult) -> String {
    [
        format!("Config written to {}", result.config_path.display()),
        format!("Source file: {}", result.source_file.display()),
        format!("Website repo: {}", result.repo_root.display()),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_PROBE_URL};
    use crate::testutil::TestEnv;

    fn make_init_inputs(source: &Path, repo: &Path) -> InitInputs {
        InitInputs {
            source_file: source.display().to_string(),
            repo_root: repo.display().to_string(),
            probe_url: DEFAULT_PROBE_URL.to_string(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }

    #[test]
    fn validate_init_valid_inputs() {
        let env = TestEnv::new();
        let repo = env.create_repo("site");

        let config = validate_init_inputs(&make_init_inputs(&env.source_file(), &repo)).unwrap();
        assert_eq!(config.repo_root, repo);
        assert_eq!(config.source_file, env.source_file());
        assert_eq!(config.probe_url, DEFAULT_PROBE_URL);
    }

    #[test]
    fn validate_init_missing_source() {
        let env = TestEnv::new();
        let repo = env.create_repo("site");

        let result = validate_init_inputs(&make_init_inputs(&env.root().join("nope.ini"), &repo));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("source file"));
    }

    #[test]
    fn validate_init_repo_path_not_exists() {
        let env = TestEnv::new();
        let result = validate_init_inputs(&make_init_inputs(
            &env.source_file(),
            Path::new("/nonexistent/site/path"),
        ));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn validate_init_not_a_git_repo() {
        let env = TestEnv::new();
        let not_git = env.plain_dir("not-git");

        let result = validate_init_inputs(&make_init_inputs(&env.source_file(), &not_git));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not a git"));
    }

    #[test]
    fn validate_init_rejects_long_probe_timeout() {
        let env = TestEnv::new();
        let repo = env.create_repo("site");
        let mut inputs = make_init_inputs(&env.source_file(), &repo);
        inputs.probe_timeout_ms = 60_000;

        let result = validate_init_inputs(&inputs);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("probe_timeout_ms"));
    }

    #[test]
    fn cmd_init_creates_config_file() {
        let env = TestEnv::new();
        let repo = env.create_repo("site");
        let config_path = env.root().join("config").join("config.toml");

        let result = cmd_init(
            make_init_inputs(&env.source_file(), &repo),
            &config_path,
            false,
        )
        .unwrap();
        assert_eq!(result.config_path, config_path);
        assert!(config_path.exists());

        let loaded = crate::config::load_config(&config_path).unwrap();
        assert_eq!(loaded.repo_root, repo);
        assert_eq!(loaded.source_file, env.source_file());
    }

    #[test]
    fn cmd_init_without_force_errors_on_existing_config() {
        let env = TestEnv::new();
        let repo = env.create_repo("site");
        let config_path = env.root().join("config").join("config.toml");
        let make = || make_init_inputs(&env.source_file(), &repo);

        cmd_init(make(), &config_path, false).unwrap();
        let result = cmd_init(make(), &config_path, false);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));

        // With force the second write succeeds
        cmd_init(make(), &config_path, true).unwrap();
    }
}
