//! Generation stage: one test artifact per source module.

use std::path::{Path, PathBuf};
use tracing::{debug, error};

use testforge_core::obs::emit_artifact_written;
use testforge_core::{
    artifact_file_name, extract_fenced_blocks, GeneratedArtifact, GenerationRequest, ModelClient,
    PipelineRun, SourceModule,
};

use crate::error::PipelineError;
use crate::prompts::generation_prompt;

/// Outcome of generating tests for a single module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOutcome {
    Written(GeneratedArtifact),
    ModelFailed(String),
    EmptyOutput,
    WriteFailed(String),
}

pub struct GenerationStage<'a> {
    client: &'a ModelClient,
    test_dir: &'a Path,
}

impl<'a> GenerationStage<'a> {
    pub fn new(client: &'a ModelClient, test_dir: &'a Path) -> Self {
        Self { client, test_dir }
    }

    /// Read each module in order and generate its artifact.
    ///
    /// An unreadable module aborts the run. Any other per-module failure is
    /// logged and the module is skipped without an artifact. A module whose
    /// artifact name is already taken in this run (same file name in another
    /// directory) is skipped before the model is called, so the earlier file
    /// is never overwritten.
    pub async fn run(&self, paths: &[PathBuf], run: &mut PipelineRun) -> Result<(), PipelineError> {
        for path in paths {
            let module = SourceModule::read(path).map_err(|source| PipelineError::ReadModule {
                path: path.clone(),
                source,
            })?;

            let target = self.artifact_path(&module);
            if let Some(owner) = run.artifacts.iter().find(|a| a.path == target) {
                error!(
                    module = %module.path().display(),
                    owner = %owner.source.display(),
                    artifact = %target.display(),
                    "Test file name already used by another module; skipping"
                );
                run.modules.push(module);
                continue;
            }

            if let ModuleOutcome::Written(artifact) = self.generate(&module).await {
                run.artifacts.push(artifact);
            }
            run.modules.push(module);
        }
        Ok(())
    }

    /// Where the artifact for `module` is written.
    pub fn artifact_path(&self, module: &SourceModule) -> PathBuf {
        self.test_dir.join(artifact_file_name(&module.file_name()))
    }

    /// Generate, extract and persist the artifact for `module`.
    pub async fn generate(&self, module: &SourceModule) -> ModuleOutcome {
        let request = GenerationRequest::new(generation_prompt(module.content()), module.path());

        let response = match self.client.generate(&request.prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!(
                    module = %request.target.display(),
                    error = %e,
                    "Error while generating tests"
                );
                return ModuleOutcome::ModelFailed(e.to_string());
            }
        };

        let code = extract_fenced_blocks(&response);
        debug!(module = %module.path().display(), "Generated test code:\n{}", code);

        if code.trim().is_empty() {
            error!(module = %module.path().display(), "Generated test code is empty");
            return ModuleOutcome::EmptyOutput;
        }

        let artifact_path = self.artifact_path(module);
        if let Err(e) = tokio::fs::write(&artifact_path, &code).await {
            error!(
                module = %module.path().display(),
                artifact = %artifact_path.display(),
                error = %e,
                "Failed to write test file"
            );
            return ModuleOutcome::WriteFailed(e.to_string());
        }

        emit_artifact_written(&artifact_path, module.path());
        ModuleOutcome::Written(GeneratedArtifact::new(
            artifact_path,
            module.path().to_path_buf(),
            code,
        ))
    }
}
