//! Repair stage: approval-gated regeneration of failing artifacts.
//!
//! The stage never re-executes tests. An artifact's recorded outcome stays
//! `Failed` after a successful repair until the next run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use testforge_core::obs::{emit_repair_applied, emit_repair_declined};
use testforge_core::{
    extract_fenced_blocks, sanitize, ApprovalProvider, CodeValidator, ModelClient, PipelineRun,
    RepairRecord, RepairStatus,
};

use crate::prompts::repair_prompt;

pub struct RepairStage<'a> {
    client: &'a ModelClient,
    approval: Arc<dyn ApprovalProvider>,
    validator: &'a dyn CodeValidator,
}

impl<'a> RepairStage<'a> {
    pub fn new(
        client: &'a ModelClient,
        approval: Arc<dyn ApprovalProvider>,
        validator: &'a dyn CodeValidator,
    ) -> Self {
        Self {
            client,
            approval,
            validator,
        }
    }

    /// Consult the approval gate on the blocking pool; a console prompt
    /// must not stall a runtime worker. A panicked provider counts as no.
    async fn confirm(&self, description: String) -> bool {
        let approval = Arc::clone(&self.approval);
        match tokio::task::spawn_blocking(move || approval.confirm(&description)).await {
            Ok(approved) => approved,
            Err(e) => {
                error!(error = %e, "Approval prompt failed; treating as no");
                false
            }
        }
    }

    /// Ask once for the whole batch of failed artifacts, then repair each in turn.
    ///
    /// Does nothing, and asks nothing, when no artifact failed. Repaired
    /// artifacts have their in-memory content updated to match the file.
    pub async fn run(&self, run: &mut PipelineRun) -> Vec<RepairRecord> {
        let failed: Vec<PathBuf> = run.failed().iter().map(|a| a.path.clone()).collect();
        if failed.is_empty() {
            return Vec::new();
        }

        let description = format!(
            "{} generated test file(s) failed. Repair them automatically?",
            failed.len()
        );
        if !self.confirm(description).await {
            emit_repair_declined(failed.len());
            return failed
                .iter()
                .map(|path| RepairRecord::new(path, RepairStatus::Declined))
                .collect();
        }

        let mut records = Vec::with_capacity(failed.len());
        for path in &failed {
            let (record, content) = self.repair(path).await;
            if let Some(content) = content {
                if let Some(artifact) = run.artifacts.iter_mut().find(|a| &a.path == path) {
                    artifact.content = content;
                }
            }
            records.push(record);
        }
        records
    }

    /// Repair one artifact. Returns the new content when the file was overwritten.
    pub async fn repair(&self, path: &Path) -> (RepairRecord, Option<String>) {
        let current = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                error!(artifact = %path.display(), error = %e, "Failed to read test file for repair");
                return (
                    RepairRecord::new(path, RepairStatus::ReadFailed).with_detail(e.to_string()),
                    None,
                );
            }
        };

        let response = match self.client.generate(&repair_prompt(&current)).await {
            Ok(text) => text,
            Err(e) => {
                error!(artifact = %path.display(), error = %e, "Failed to repair test file");
                return (
                    RepairRecord::new(path, RepairStatus::ModelFailed).with_detail(e.to_string()),
                    None,
                );
            }
        };

        let fixed = sanitize(&extract_fenced_blocks(&response));
        if fixed.is_empty() {
            error!(artifact = %path.display(), "Repaired test code is empty");
            return (RepairRecord::new(path, RepairStatus::EmptyOutput), None);
        }

        if let Err(e) = self.validator.validate(&fixed).await {
            error!(artifact = %path.display(), error = %e, "Repaired code failed validation");
            return (
                RepairRecord::new(path, RepairStatus::SyntaxRejected).with_detail(e.to_string()),
                None,
            );
        }

        if let Err(e) = tokio::fs::write(path, &fixed).await {
            error!(artifact = %path.display(), error = %e, "Failed to write repaired test file");
            return (
                RepairRecord::new(path, RepairStatus::WriteFailed).with_detail(e.to_string()),
                None,
            );
        }

        emit_repair_applied(path);
        info!(artifact = %path.display(), "Fixed");
        (RepairRecord::new(path, RepairStatus::Repaired), Some(fixed))
    }
}
