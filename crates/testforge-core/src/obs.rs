//! Structured events for the pipeline lifecycle.
//!
//! Each helper emits one `info!` (or `warn!`) line with an `event` field so
//! runs can be followed in JSON logs.

use std::path::Path;
use tracing::{info, warn};

/// Span carrying the run id; attach it to the run future with
/// `tracing::Instrument` so every stage's log lines are tagged.
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("testforge.run", run_id = %run_id)
}

pub fn emit_run_started(run_id: &str, source_root: &Path, test_dir: &Path) {
    info!(
        event = "run.started",
        run_id = %run_id,
        source_root = %source_root.display(),
        test_dir = %test_dir.display(),
    );
}

pub fn emit_run_finished(run_id: &str, artifacts: usize, passed: usize, failed: usize) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        artifacts = artifacts,
        passed = passed,
        failed = failed,
    );
}

pub fn emit_artifact_written(artifact: &Path, source: &Path) {
    info!(
        event = "artifact.written",
        artifact = %artifact.display(),
        source = %source.display(),
        "Generated test file: {}",
        artifact.display()
    );
}

pub fn emit_artifact_executed(artifact: &Path, passed: bool) {
    info!(
        event = "artifact.executed",
        artifact = %artifact.display(),
        passed = passed,
    );
}

pub fn emit_repair_applied(artifact: &Path) {
    info!(
        event = "repair.applied",
        artifact = %artifact.display(),
        "Repaired: {}",
        artifact.display()
    );
}

pub fn emit_repair_declined(failed: usize) {
    warn!(event = "repair.declined", failed = failed, "Automatic repair declined");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_span_create() {
        let span = run_span("run-under-test");
        let _guard = span.enter();
        emit_artifact_executed(Path::new("tests/test_a.py"), true);
    }
}
