//! Execution stage: run every artifact once and record the outcome.

use tracing::error;

use testforge_core::obs::emit_artifact_executed;
use testforge_core::{ExecutionOutcome, GeneratedArtifact};

use crate::runner::TestRunner;

pub struct ExecutionStage<'a> {
    runner: &'a dyn TestRunner,
}

impl<'a> ExecutionStage<'a> {
    pub fn new(runner: &'a dyn TestRunner) -> Self {
        Self { runner }
    }

    /// Set the outcome of each artifact, in order.
    ///
    /// A runner error marks that artifact failed and the batch continues.
    pub async fn run(&self, artifacts: &mut [GeneratedArtifact]) {
        for artifact in artifacts.iter_mut() {
            let passed = match self.runner.run_suite(&artifact.path).await {
                Ok(passed) => passed,
                Err(e) => {
                    error!(
                        artifact = %artifact.path.display(),
                        error = %e,
                        "Error while running tests"
                    );
                    false
                }
            };
            artifact.outcome = ExecutionOutcome::from_success(passed);
            emit_artifact_executed(&artifact.path, passed);
        }
    }
}
