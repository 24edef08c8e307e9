//! Generated test artifacts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix applied to a module's basename to name its test file.
pub const ARTIFACT_PREFIX: &str = "test_";

/// Derive the artifact file name for a module basename.
///
/// Deterministic, so regenerating the same module overwrites the previous artifact.
pub fn artifact_file_name(module_file_name: &str) -> String {
    format!("{ARTIFACT_PREFIX}{module_file_name}")
}

/// Result of running an artifact through the test runner.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    #[default]
    Unset,
    Passed,
    Failed,
}

impl ExecutionOutcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            ExecutionOutcome::Passed
        } else {
            ExecutionOutcome::Failed
        }
    }
}

/// A test file written for exactly one source module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Path of the test file inside the test directory.
    pub path: PathBuf,

    /// Path of the module this artifact was generated from.
    pub source: PathBuf,

    /// Content as last written to disk.
    pub content: String,

    /// Set by the execution stage.
    pub outcome: ExecutionOutcome,
}

impl GeneratedArtifact {
    pub fn new(path: PathBuf, source: PathBuf, content: String) -> Self {
        Self {
            path,
            source,
            content,
            outcome: ExecutionOutcome::Unset,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn passed(&self) -> bool {
        self.outcome == ExecutionOutcome::Passed
    }

    pub fn failed(&self) -> bool {
        self.outcome == ExecutionOutcome::Failed
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
