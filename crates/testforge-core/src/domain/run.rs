//! The per-invocation pipeline aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::artifact::GeneratedArtifact;
use super::module::SourceModule;

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    /// Discovery found nothing to test. Not an error.
    NoModules,
    Completed,
}

/// What happened to one failed artifact during repair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    /// Corrected content was written over the artifact.
    Repaired,
    /// The operator declined the repair batch.
    Declined,
    /// The current artifact content could not be read.
    ReadFailed,
    /// The model call failed after retries.
    ModelFailed,
    /// The model answered without any usable code.
    EmptyOutput,
    /// The corrected content did not parse; the artifact was left untouched.
    SyntaxRejected,
    /// The corrected content could not be written.
    WriteFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepairRecord {
    pub artifact: PathBuf,
    pub status: RepairStatus,
    pub detail: Option<String>,
}

impl RepairRecord {
    pub fn new(artifact: &Path, status: RepairStatus) -> Self {
        Self {
            artifact: artifact.to_path_buf(),
            status,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Counts derived from a run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub modules: usize,
    pub artifacts: usize,
    pub passed: usize,
    pub failed: usize,
    pub repaired: usize,
}

/// Everything one invocation discovered, generated, executed and repaired.
///
/// Not persisted; the test directory on disk is the only state that outlives it.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub modules: Vec<SourceModule>,
    pub artifacts: Vec<GeneratedArtifact>,
    pub repairs: Vec<RepairRecord>,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            status: RunStatus::Running,
            modules: Vec::new(),
            artifacts: Vec::new(),
            repairs: Vec::new(),
        }
    }

    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }

    pub fn passed(&self) -> Vec<&GeneratedArtifact> {
        self.artifacts.iter().filter(|a| a.passed()).collect()
    }

    pub fn failed(&self) -> Vec<&GeneratedArtifact> {
        self.artifacts.iter().filter(|a| a.failed()).collect()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            modules: self.modules.len(),
            artifacts: self.artifacts.len(),
            passed: self.passed().len(),
            failed: self.failed().len(),
            repaired: self
                .repairs
                .iter()
                .filter(|r| r.status == RepairStatus::Repaired)
                .count(),
        }
    }

    /// Every artifact must trace to exactly one discovered module, no module
    /// may own two artifacts, and no two artifacts may share a file.
    pub fn is_traceable(&self) -> bool {
        let modules: HashSet<&Path> = self.modules.iter().map(|m| m.path()).collect();
        let mut owners = HashSet::new();
        let mut files = HashSet::new();
        self.artifacts.iter().all(|a| {
            modules.contains(a.source.as_path())
                && owners.insert(a.source.as_path())
                && files.insert(a.path.as_path())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExecutionOutcome;

    fn artifact(name: &str, source: &str, outcome: ExecutionOutcome) -> GeneratedArtifact {
        let mut a = GeneratedArtifact::new(
            PathBuf::from(format!("tests/{name}")),
            PathBuf::from(source),
            String::new(),
        );
        a.outcome = outcome;
        a
    }

    #[test]
    fn test_summary_counts() {
        let mut run = PipelineRun::new();
        run.modules.push(SourceModule::new("src/a.py", ""));
        run.modules.push(SourceModule::new("src/b.py", ""));
        run.artifacts
            .push(artifact("test_a.py", "src/a.py", ExecutionOutcome::Passed));
        run.artifacts
            .push(artifact("test_b.py", "src/b.py", ExecutionOutcome::Failed));
        run.repairs.push(RepairRecord::new(
            Path::new("tests/test_b.py"),
            RepairStatus::Repaired,
        ));

        let summary = run.summary();
        assert_eq!(summary.modules, 2);
        assert_eq!(summary.artifacts, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.repaired, 1);
    }

    #[test]
    fn test_traceability_rejects_orphans_and_duplicates() {
        let mut run = PipelineRun::new();
        run.modules.push(SourceModule::new("src/a.py", ""));
        run.artifacts
            .push(artifact("test_a.py", "src/a.py", ExecutionOutcome::Unset));
        assert!(run.is_traceable());

        run.artifacts
            .push(artifact("test_a2.py", "src/a.py", ExecutionOutcome::Unset));
        assert!(!run.is_traceable());

        run.artifacts.pop();
        run.artifacts
            .push(artifact("test_z.py", "src/z.py", ExecutionOutcome::Unset));
        assert!(!run.is_traceable());
    }

    #[test]
    fn test_traceability_rejects_shared_artifact_file() {
        let mut run = PipelineRun::new();
        run.modules.push(SourceModule::new("src/a/util.py", ""));
        run.modules.push(SourceModule::new("src/b/util.py", ""));
        run.artifacts.push(artifact(
            "test_util.py",
            "src/a/util.py",
            ExecutionOutcome::Unset,
        ));
        assert!(run.is_traceable());

        run.artifacts.push(artifact(
            "test_util.py",
            "src/b/util.py",
            ExecutionOutcome::Unset,
        ));
        assert!(!run.is_traceable());
    }

    #[test]
    fn test_finish_sets_timestamp() {
        let mut run = PipelineRun::new();
        assert_eq!(run.status, RunStatus::Running);
        run.finish(RunStatus::NoModules);
        assert_eq!(run.status, RunStatus::NoModules);
        assert!(run.finished_at.is_some());
    }
}
