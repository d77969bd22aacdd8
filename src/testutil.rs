#![cfg(test)]

use anyhow::{anyhow, Result};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;

use crate::config::{ResolvedConfig, DEFAULT_PROBE_URL};
use crate::connectivity::Reachability;
use crate::error::WorkflowError;
use crate::runner::{CommandResult, ProcessRunner};
use crate::state::{AppState, StateStore};

pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::create_dir_all(dir.path().join("game")).unwrap();
        std::fs::create_dir_all(dir.path().join("state")).unwrap();
        std::fs::write(
            dir.path().join("game").join("personalbest.ini"),
            "[ks_nordschleife@tourist]\nks_porsche_911_gt3_r=420123\n",
        )
        .unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn source_file(&self) -> PathBuf {
        self.dir.path().join("game").join("personalbest.ini")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    pub fn plain_dir(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join("src").join(name);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn config_for(&self, repo_root: &Path) -> ResolvedConfig {
        ResolvedConfig {
            source_file: self.source_file(),
            repo_root: repo_root.to_path_buf(),
            probe_url: DEFAULT_PROBE_URL.to_string(),
            probe_timeout: Duration::from_millis(500),
        }
    }

    /// A repository with one empty commit on `main` and a local identity.
    pub fn create_repo(&self, name: &str) -> PathBuf {
        let repo_path = self.plain_dir(name);
        git_ok(&repo_path, &["init", "-b", "main"]);
        configure_identity(&repo_path);
        git_ok(&repo_path, &["commit", "--allow-empty", "-m", "initial"]);
        repo_path
    }

    /// A bare remote plus a clone whose `main` tracks it and is fully pushed.
    pub fn create_published_repo(&self, name: &str) -> (PathBuf, PathBuf) {
        let remote = self.dir.path().join("remotes").join(format!("{}.git", name));
        std::fs::create_dir_all(&remote).unwrap();
        git_ok(&remote, &["init", "--bare", "-b", "main"]);

        let work = self.plain_dir(name);
        git_ok(&work, &["init", "-b", "main"]);
        configure_identity(&work);
        git_ok(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);
        git_ok(&work, &["commit", "--allow-empty", "-m", "initial"]);
        git_ok(&work, &["push", "-u", "origin", "main"]);

        (remote, work)
    }

    pub fn commit_file(&self, repo: &Path, file: &str, contents: &str) {
        std::fs::write(repo.join(file), contents).unwrap();
        git_ok(repo, &["add", file]);
        git_ok(repo, &["commit", "-m", &format!("update {}", file)]);
    }

    pub fn git_output(&self, repo: &Path, args: &[&str]) -> String {
        git_ok(repo, args)
    }
}

fn configure_identity(repo: &Path) {
    git_ok(repo, &["config", "user.name", "Test"]);
    git_ok(repo, &["config", "user.email", "test@test.com"]);
    git_ok(repo, &["config", "commit.gpgsign", "false"]);
}

fn git_ok(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@test.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@test.com")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

enum Scripted {
    Result(CommandResult),
    SpawnFailure,
}

/// Replays canned results in order and records the argument lines it saw.
/// Any call that does not match the next expected one fails the test.
pub struct ScriptedRunner {
    expected: RefCell<VecDeque<(String, Scripted)>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            expected: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn respond(self, args: &str, result: CommandResult) -> Self {
        self.expected
            .borrow_mut()
            .push_back((args.to_string(), Scripted::Result(result)));
        self
    }

    pub fn fail_to_spawn(self, args: &str) -> Self {
        self.expected
            .borrow_mut()
            .push_back((args.to_string(), Scripted::SpawnFailure));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str], _working_dir: &Path) -> Result<CommandResult> {
        assert_eq!(program, "git", "only git is scripted");
        let line = args.join(" ");
        self.calls.borrow_mut().push(line.clone());

        let (expected, scripted) = self
            .expected
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected command: git {}", line));
        assert_eq!(line, expected, "commands ran out of order");

        match scripted {
            Scripted::Result(result) => Ok(result),
            Scripted::SpawnFailure => Err(anyhow!("could not start git {}", line)),
        }
    }
}

pub struct StubProbe {
    online: bool,
    checks: Cell<usize>,
}

impl StubProbe {
    pub fn new(online: bool) -> Self {
        Self {
            online,
            checks: Cell::new(0),
        }
    }

    pub fn checks(&self) -> usize {
        self.checks.get()
    }
}

impl Reachability for StubProbe {
    fn check(&self) -> Result<(), WorkflowError> {
        self.checks.set(self.checks.get() + 1);
        if self.online {
            Ok(())
        } else {
            Err(WorkflowError::Connectivity {
                reason: "stubbed offline".to_string(),
            })
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: AppState,
}

impl MemoryStateStore {
    pub fn with(state: AppState) -> Self {
        Self { state }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<AppState> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &AppState) -> Result<()> {
        self.state = state.clone();
        Ok(())
    }
}

/// Loads fine but never persists, like a state dir on a read-only volume.
#[derive(Debug, Default)]
pub struct ReadOnlyStateStore {
    state: AppState,
}

impl StateStore for ReadOnlyStateStore {
    fn load(&self) -> Result<AppState> {
        Ok(self.state.clone())
    }

    fn save(&mut self, _state: &AppState) -> Result<()> {
        Err(anyhow!("state directory is read-only"))
    }
}
