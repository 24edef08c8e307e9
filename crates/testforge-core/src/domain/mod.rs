//! Domain models for testforge.
//!
//! Canonical definitions for the core entities:
//! - `SourceModule`: a discovered source file, read once
//! - `GeneratedArtifact`: the test file produced for exactly one module
//! - `PipelineRun`: the transient aggregate of one invocation

pub mod artifact;
pub mod module;
pub mod run;

pub use artifact::{artifact_file_name, ExecutionOutcome, GeneratedArtifact};
pub use module::{GenerationRequest, SourceModule};
pub use run::{PipelineRun, RepairRecord, RepairStatus, RunStatus, RunSummary};
