//! Error taxonomy for testforge.
//!
//! Fatal setup errors ([`ConfigError`], [`DiscoveryError::SourceRootMissing`])
//! abort a run before any stage executes. Everything else is contained at the
//! stage boundary that produced it.

use std::path::PathBuf;

/// Errors raised while assembling configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid configuration value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Errors surfaced by the generative backend and the model client.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The backend refused the call because a usage quota was exceeded.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode backend response: {0}")]
    Decode(String),

    #[error("unrecognized response shape (top-level keys: {keys})")]
    UnrecognizedShape { keys: String },
}

impl ModelError {
    /// Quota exhaustion and timeouts are the only retryable conditions.
    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::ResourceExhausted(_) | ModelError::Timeout(_))
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Timeout(err.to_string())
        } else if err.is_decode() {
            ModelError::Decode(err.to_string())
        } else {
            ModelError::Transport(err.to_string())
        }
    }
}

/// Errors raised while enumerating source modules.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("source root does not exist: {0}")]
    SourceRootMissing(PathBuf),

    #[error("failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },
}

/// Why candidate code was refused by a [`crate::CodeValidator`].
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("failed to run {program} for a compile check: {source}")]
    Interpreter {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A syntax error located in generated code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at line {line}, column {column}: {snippet}")]
pub struct SyntaxError {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// Offending source text, truncated.
    pub snippet: String,
}

/// Errors raised while invoking the external test runner.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("runner {0} has empty command")]
    EmptyCommand(String),

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("test run for {artifact} timed out after {timeout_secs} seconds")]
    TimedOut { artifact: PathBuf, timeout_secs: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ModelError::ResourceExhausted("quota".into()).is_transient());
        assert!(ModelError::Timeout("deadline".into()).is_transient());
        assert!(!ModelError::Transport("refused".into()).is_transient());
        assert!(!ModelError::Http {
            status: 500,
            body: "boom".into()
        }
        .is_transient());
        assert!(!ModelError::UnrecognizedShape { keys: "x".into() }.is_transient());
    }

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError {
            line: 3,
            column: 7,
            snippet: "def (".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("column 7"));
    }

    #[test]
    fn test_source_root_missing_mentions_path() {
        let err = DiscoveryError::SourceRootMissing(PathBuf::from("/nope/src"));
        assert!(err.to_string().contains("/nope/src"));
    }
}
