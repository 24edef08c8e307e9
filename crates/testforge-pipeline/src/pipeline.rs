//! Pipeline orchestration: discover, generate, execute, report, repair.

use std::sync::Arc;
use tracing::{info, Instrument};

use testforge_core::obs::{emit_run_finished, emit_run_started, run_span};
use testforge_core::{
    discover_modules, ApprovalProvider, CodeValidator, DiscoveryConfig, LayoutConfig, ModelClient,
    PipelineRun, PythonCompileCheck, RunStatus,
};

use crate::error::PipelineError;
use crate::execution::ExecutionStage;
use crate::generation::GenerationStage;
use crate::repair::RepairStage;
use crate::reporter::TestReport;
use crate::runner::TestRunner;

/// Where to look and what counts as a module.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub layout: LayoutConfig,
    pub discovery: DiscoveryConfig,
}

impl PipelineConfig {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            discovery: DiscoveryConfig::default(),
        }
    }

    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    client: ModelClient,
    runner: Arc<dyn TestRunner>,
    approval: Arc<dyn ApprovalProvider>,
    validator: Arc<dyn CodeValidator>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        client: ModelClient,
        runner: Arc<dyn TestRunner>,
        approval: Arc<dyn ApprovalProvider>,
    ) -> Self {
        Self {
            config,
            client,
            runner,
            approval,
            validator: Arc::new(PythonCompileCheck::default()),
        }
    }

    /// Replace the check repaired code must pass (default: `python3` compile).
    pub fn with_validator(mut self, validator: Arc<dyn CodeValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage once.
    ///
    /// Returns an error only when the source root is missing, the test
    /// directory cannot be created, or a discovered module cannot be read.
    /// Everything else is recorded on the returned run.
    pub async fn run(&self) -> Result<PipelineRun, PipelineError> {
        let run = PipelineRun::new();
        let span = run_span(&run.run_id.to_string());
        self.execute(run).instrument(span).await
    }

    async fn execute(&self, mut run: PipelineRun) -> Result<PipelineRun, PipelineError> {
        let layout = &self.config.layout;
        let run_id = run.run_id.to_string();
        emit_run_started(&run_id, &layout.source_root, &layout.test_dir);

        let paths = discover_modules(&layout.source_root, &self.config.discovery)?;

        tokio::fs::create_dir_all(&layout.test_dir)
            .await
            .map_err(|source| PipelineError::CreateTestDir {
                path: layout.test_dir.clone(),
                source,
            })?;

        if paths.is_empty() {
            info!("No modules to process; stopping");
            run.finish(RunStatus::NoModules);
            emit_run_finished(&run_id, 0, 0, 0);
            return Ok(run);
        }

        GenerationStage::new(&self.client, &layout.test_dir)
            .run(&paths, &mut run)
            .await?;

        if !run.artifacts.is_empty() {
            info!("Running unit tests...");
            ExecutionStage::new(self.runner.as_ref())
                .run(&mut run.artifacts)
                .await;

            let report = TestReport::from_artifacts(&run.artifacts);
            report.log();

            if !report.all_passed() {
                let repairs = RepairStage::new(
                    &self.client,
                    Arc::clone(&self.approval),
                    self.validator.as_ref(),
                )
                .run(&mut run)
                .await;
                run.repairs = repairs;
            }
        }

        run.finish(RunStatus::Completed);
        emit_run_finished(
            &run_id,
            run.artifacts.len(),
            run.passed().len(),
            run.failed().len(),
        );
        Ok(run)
    }
}
