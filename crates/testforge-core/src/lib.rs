//! testforge core library.
//!
//! Domain model, generative model client, and the source-handling pieces the
//! pipeline stages are built from.

pub mod approval;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod extract;
pub mod fakes;
pub mod model;
pub mod obs;
pub mod report;
pub mod syntax;
pub mod telemetry;

pub use approval::{ApprovalProvider, ConsoleApproval, FixedApproval, RecordingApproval};
pub use config::{DiscoveryConfig, LayoutConfig, ModelConfig};
pub use discovery::discover_modules;
pub use domain::{
    artifact_file_name, ExecutionOutcome, GeneratedArtifact, GenerationRequest, PipelineRun,
    RepairRecord, RepairStatus, RunStatus, RunSummary, SourceModule,
};
pub use error::{
    ConfigError, DiscoveryError, ModelError, RunnerError, SyntaxError, ValidationError,
};
pub use extract::{extract_fenced_blocks, sanitize};
pub use model::{
    normalize_response, GeminiBackend, GenerativeBackend, ModelClient, RetryPolicy, ShapeMatcher,
};
pub use obs::run_span;
pub use report::{content_digest, read_run_report, write_run_report, ArtifactEntry, RunReport};
pub use syntax::{check_python_syntax, CodeValidator, PythonCompileCheck, TreeSitterCheck};
pub use telemetry::init_tracing;

/// testforge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
