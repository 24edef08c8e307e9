//! In-memory test runner fake (testing only).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use testforge_core::RunnerError;

use crate::runner::TestRunner;

/// Runner whose verdict is decided by artifact file name.
#[derive(Debug, Default)]
pub struct FakeRunner {
    failing: HashSet<String>,
    erroring: HashSet<String>,
    executed: Mutex<Vec<PathBuf>>,
}

impl FakeRunner {
    /// Every artifact passes unless configured otherwise.
    pub fn passing() -> Self {
        Self::default()
    }

    pub fn fail(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    /// The runner itself errors for this artifact.
    pub fn error(mut self, file_name: &str) -> Self {
        self.erroring.insert(file_name.to_string());
        self
    }

    pub fn executed(&self) -> Vec<PathBuf> {
        self.executed.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TestRunner for FakeRunner {
    async fn run_suite(&self, artifact: &Path) -> Result<bool, RunnerError> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(artifact.to_path_buf());
        }
        let name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.erroring.contains(&name) {
            return Err(RunnerError::EmptyCommand(name));
        }
        Ok(!self.failing.contains(&name))
    }
}
