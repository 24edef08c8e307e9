//! The human-in-the-loop gate in front of automated repair.

use std::io::{BufRead, Write};
use std::sync::Mutex;
use tracing::warn;

/// A single yes/no decision for a whole batch of proposed actions.
///
/// `confirm` may block on a terminal; async callers run it with
/// `tokio::task::spawn_blocking`.
pub trait ApprovalProvider: Send + Sync {
    fn confirm(&self, batch_description: &str) -> bool;
}

/// Ask the operator on the terminal. Only `yes` (any case) approves.
#[derive(Debug, Default)]
pub struct ConsoleApproval;

impl ConsoleApproval {
    /// Read one answer from `input` after writing the prompt to `output`.
    pub fn ask<R: BufRead, W: Write>(batch_description: &str, input: &mut R, output: &mut W) -> bool {
        if let Err(e) = write!(output, "{} (yes/no): ", batch_description).and_then(|_| output.flush()) {
            warn!(error = %e, "Failed to write approval prompt");
        }

        let mut answer = String::new();
        match input.read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                warn!(error = %e, "Failed to read approval answer; treating as no");
                false
            }
        }
    }
}

impl ApprovalProvider for ConsoleApproval {
    fn confirm(&self, batch_description: &str) -> bool {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        Self::ask(batch_description, &mut stdin.lock(), &mut stdout.lock())
    }
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

/// A fixed answer, for unattended runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedApproval(pub bool);

impl ApprovalProvider for FixedApproval {
    fn confirm(&self, _batch_description: &str) -> bool {
        self.0
    }
}

/// Wraps another provider and remembers every description it was asked about.
#[derive(Debug)]
pub struct RecordingApproval<P> {
    inner: P,
    asked: Mutex<Vec<String>>,
}

impl<P: ApprovalProvider> RecordingApproval<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl<P: ApprovalProvider> ApprovalProvider for RecordingApproval<P> {
    fn confirm(&self, batch_description: &str) -> bool {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(batch_description.to_string());
        }
        self.inner.confirm(batch_description)
    }
}
