use serde::Serialize;

use crate::runner::CommandResult;

/// Ordered record of what the workflow ran and what each step printed.
/// In echo mode every line is also written to stderr as it is appended, so a
/// user watching the terminal sees progress while git runs.
#[derive(Debug, Default, Serialize)]
pub struct ObservationLog {
    lines: Vec<String>,
    #[serde(skip)]
    echo: bool,
}

impl ObservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echoing() -> Self {
        Self {
            lines: Vec::new(),
            echo: true,
        }
    }

    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{}", message);
        self.push(message);
    }

    /// Appends a step's output verbatim, then its exit code and a separator.
    pub fn record(&mut self, result: &CommandResult) {
        if !result.stdout.trim().is_empty() {
            self.push(result.stdout.clone());
        }
        if !result.stderr.trim().is_empty() {
            self.push(result.stderr.clone());
        }
        self.push(format!("Exit code: {}", result.exit_code));
        self.push(String::new());
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[cfg(test)]
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    fn push(&mut self, line: String) {
        if self.echo {
            eprintln!("{}", line);
        }
        self.lines.push(line);
    }
}
