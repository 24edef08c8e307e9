//! Generation, execution and repair stages, and the pipeline that drives them.

pub mod error;
pub mod execution;
pub mod fakes;
pub mod generation;
pub mod pipeline;
pub mod prompts;
pub mod repair;
pub mod reporter;
pub mod runner;

pub use error::PipelineError;
pub use execution::ExecutionStage;
pub use generation::{GenerationStage, ModuleOutcome};
pub use pipeline::{Pipeline, PipelineConfig};
pub use repair::RepairStage;
pub use reporter::TestReport;
pub use runner::{BuiltinRunner, ProcessTestRunner, RunnerConfig, SuiteResult, TestRunner};
