//! JSON run report written at the end of a run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::domain::{ExecutionOutcome, PipelineRun, RepairStatus, RunStatus, RunSummary};

pub const REPORT_SCHEMA_VERSION: &str = "1";

/// One artifact as it stood when the run ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub path: PathBuf,
    pub source: PathBuf,
    /// Outcome recorded by the execution stage. Not re-verified after repair.
    pub outcome: ExecutionOutcome,
    /// SHA-256 of the content last written to disk.
    pub sha256: String,
    pub repair: Option<RepairStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunReport {
    pub schema_version: String,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub source_root: PathBuf,
    pub test_dir: PathBuf,
    pub modules: Vec<PathBuf>,
    pub artifacts: Vec<ArtifactEntry>,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn from_run(run: &PipelineRun, source_root: &Path, test_dir: &Path) -> Self {
        let artifacts = run
            .artifacts
            .iter()
            .map(|a| ArtifactEntry {
                path: a.path.clone(),
                source: a.source.clone(),
                outcome: a.outcome,
                sha256: content_digest(&a.content),
                repair: run
                    .repairs
                    .iter()
                    .find(|r| r.artifact == a.path)
                    .map(|r| r.status),
            })
            .collect();

        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            run_id: run.run_id,
            started_at: run.started_at,
            finished_at: run.finished_at,
            status: run.status,
            source_root: source_root.to_path_buf(),
            test_dir: test_dir.to_path_buf(),
            modules: run.modules.iter().map(|m| m.path().to_path_buf()).collect(),
            artifacts,
            summary: run.summary(),
        }
    }
}

/// Hex SHA-256 of `content`.
pub fn content_digest(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Write the report as pretty JSON.
pub fn write_run_report(path: &Path, report: &RunReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize run report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Read a report written by [`write_run_report`].
pub fn read_run_report(path: &Path) -> Result<RunReport> {
    let content = std::fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
    serde_json::from_str(&content).context("parse run report")
}
