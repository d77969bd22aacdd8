use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Exit code reported for a process killed by a signal or never started.
pub const NO_EXIT_CODE: i32 = -1;

/// Outcome of one external process invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// A step that could not be started is reported like a failed step so the
    /// sequencing and the observation log treat both the same way.
    pub fn spawn_failure(err: &anyhow::Error) -> Self {
        Self::new(String::new(), format!("{:#}", err), NO_EXIT_CODE)
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

pub trait ProcessRunner {
    fn run(&self, program: &str, args: &[&str], working_dir: &Path) -> Result<CommandResult>;
}

/// Runs real processes. Both output streams are drained line by line on their
/// own threads while the child runs, so a chatty process never blocks on a
/// full pipe.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], working_dir: &Path) -> Result<CommandResult> {
        log::debug!(
            "running {} {} in {}",
            program,
            args.join(" "),
            working_dir.display()
        );

        let mut child = Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| {
                format!(
                    "failed to run {} {:?} in {}",
                    program,
                    args,
                    working_dir.display()
                )
            })?;

        let stdout = child.stdout.take().context("child stdout was not captured")?;
        let stderr = child.stderr.take().context("child stderr was not captured")?;

        let stdout_reader = thread::spawn(move || collect_lines(stdout, "stdout"));
        let stderr_reader = thread::spawn(move || collect_lines(stderr, "stderr"));

        let status = child
            .wait()
            .with_context(|| format!("failed to wait for {}", program))?;

        let stdout_lines = stdout_reader
            .join()
            .map_err(|_| anyhow!("stdout reader for {} panicked", program))?;
        let stderr_lines = stderr_reader
            .join()
            .map_err(|_| anyhow!("stderr reader for {} panicked", program))?;

        let exit_code = status.code().unwrap_or(NO_EXIT_CODE);
        log::debug!("{} {} exited with {}", program, args.join(" "), exit_code);

        Ok(CommandResult {
            stdout: stdout_lines.join(LINE_ENDING),
            stderr: stderr_lines.join(LINE_ENDING),
            exit_code,
        })
    }
}

fn collect_lines<R: Read>(stream: R, label: &'static str) -> Vec<String> {
    let mut reader = BufReader::new(stream);
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                log::trace!("[{}] {}", label, line);
                lines.push(line);
            }
            Err(e) => {
                log::warn!("stopped reading {}: {}", label, e);
                break;
            }
        }
    }

    lines
}

/// Runs git and folds a spawn failure into the result.
pub fn run_git(runner: &dyn ProcessRunner, repo: &Path, args: &[&str]) -> CommandResult {
    match runner.run("git", args, repo) {
        Ok(result) => result,
        Err(e) => {
            log::warn!("{:#}", e);
            CommandResult::spawn_failure(&e)
        }
    }
}
