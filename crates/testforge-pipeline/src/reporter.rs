//! Pass/fail summary of an execution stage.

use std::path::PathBuf;
use tracing::info;

use testforge_core::GeneratedArtifact;

/// Artifacts partitioned by recorded outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestReport {
    pub passed: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl TestReport {
    /// Partition `artifacts` without touching them. Artifacts that were never
    /// executed appear in neither list.
    pub fn from_artifacts(artifacts: &[GeneratedArtifact]) -> Self {
        let mut report = Self::default();
        for artifact in artifacts {
            if artifact.passed() {
                report.passed.push(artifact.path.clone());
            } else if artifact.failed() {
                report.failed.push(artifact.path.clone());
            }
        }
        report
    }

    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }

    /// Log counts and file lists.
    pub fn log(&self) {
        info!("Test results:");
        info!(count = self.passed.len(), "Passed tests: {}", self.passed.len());
        for path in &self.passed {
            info!(" - {}", path.display());
        }
        info!(count = self.failed.len(), "Failed tests: {}", self.failed.len());
        for path in &self.failed {
            info!(" - {}", path.display());
        }
    }
}
