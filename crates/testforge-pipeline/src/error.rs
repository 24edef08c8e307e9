//! Fatal pipeline errors.
//!
//! Per-module and per-artifact failures never surface here; they are logged
//! and recorded where they happen.

use std::path::PathBuf;
use testforge_core::DiscoveryError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("failed to read source module {path}: {source}")]
    ReadModule {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create test directory {path}: {source}")]
    CreateTestDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn is_source_root_missing(&self) -> bool {
        matches!(
            self,
            PipelineError::Discovery(DiscoveryError::SourceRootMissing(_))
        )
    }
}
