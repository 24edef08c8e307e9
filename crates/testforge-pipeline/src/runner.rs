//! Test runner configuration and process execution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

use testforge_core::RunnerError;

/// Runs one artifact and reports whether every test in it passed.
#[async_trait]
pub trait TestRunner: Send + Sync {
    async fn run_suite(&self, artifact: &Path) -> Result<bool, RunnerError>;
}

/// Builtin Python test runners.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinRunner {
    /// python -m unittest discover -s <test_dir> -p <file>
    #[default]
    Unittest,

    /// python -m pytest -q <artifact>
    Pytest,
}

impl BuiltinRunner {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinRunner::Unittest => "unittest",
            BuiltinRunner::Pytest => "pytest",
        }
    }

    /// Command line scoped to the single artifact at `artifact` inside `test_dir`.
    pub fn command(&self, python: &str, test_dir: &Path, artifact: &Path) -> Vec<String> {
        match self {
            BuiltinRunner::Unittest => {
                let pattern = artifact
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                vec![
                    python.to_string(),
                    "-m".to_string(),
                    "unittest".to_string(),
                    "discover".to_string(),
                    "-s".to_string(),
                    test_dir.to_string_lossy().into_owned(),
                    "-p".to_string(),
                    pattern,
                ]
            }
            BuiltinRunner::Pytest => vec![
                python.to_string(),
                "-m".to_string(),
                "pytest".to_string(),
                "-q".to_string(),
                artifact.to_string_lossy().into_owned(),
            ],
        }
    }
}

impl FromStr for BuiltinRunner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unittest" => Ok(BuiltinRunner::Unittest),
            "pytest" => Ok(BuiltinRunner::Pytest),
            other => Err(format!("unknown runner: {other} (expected unittest or pytest)")),
        }
    }
}

/// Configuration for the process-backed runner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunnerConfig {
    pub runner: BuiltinRunner,

    /// Python interpreter to invoke.
    pub python: String,

    /// Per-artifact timeout in seconds (0 = none).
    pub timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            runner: BuiltinRunner::Unittest,
            python: "python3".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Result of running one artifact.
#[derive(Debug, Clone)]
pub struct SuiteResult {
    pub artifact: PathBuf,

    /// Exit code (0 = success, -1 when killed by a signal).
    pub exit_code: i32,

    pub stdout: String,

    pub stderr: String,

    pub duration_ms: u64,

    pub success: bool,
}

impl SuiteResult {
    pub fn passed(&self) -> bool {
        self.success
    }
}

/// Spawns the configured Python test runner for each artifact.
///
/// The working directory is the parent of the test directory, so generated
/// tests can import the source package the same way the project does.
#[derive(Debug, Clone, Default)]
pub struct ProcessTestRunner {
    config: RunnerConfig,
}

impl ProcessTestRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the artifact and capture its output.
    pub async fn execute(&self, artifact: &Path) -> Result<SuiteResult, RunnerError> {
        let start = Instant::now();

        let artifact = tokio::fs::canonicalize(artifact).await?;
        let test_dir = artifact.parent().unwrap_or(Path::new(".")).to_path_buf();
        let command = self
            .config
            .runner
            .command(&self.config.python, &test_dir, &artifact);

        let (exe, args) = command
            .split_first()
            .ok_or_else(|| RunnerError::EmptyCommand(self.config.runner.name().to_string()))?;
        if exe.is_empty() {
            return Err(RunnerError::EmptyCommand(self.config.runner.name().to_string()));
        }

        let mut cmd = Command::new(exe);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(root) = test_dir.parent() {
            cmd.current_dir(root);
        }

        debug!(command = ?command, "Running test suite");
        let child = cmd.spawn().map_err(|source| RunnerError::Spawn {
            program: exe.clone(),
            source,
        })?;

        let output = if self.config.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(self.config.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| RunnerError::TimedOut {
                artifact: artifact.clone(),
                timeout_secs: self.config.timeout_secs,
            })??
        } else {
            child.wait_with_output().await?
        };

        Ok(SuiteResult {
            artifact,
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
            success: output.status.success(),
        })
    }
}

#[async_trait]
impl TestRunner for ProcessTestRunner {
    async fn run_suite(&self, artifact: &Path) -> Result<bool, RunnerError> {
        let result = self.execute(artifact).await?;
        debug!(
            artifact = %result.artifact.display(),
            exit_code = result.exit_code,
            duration_ms = result.duration_ms,
            stdout = %result.stdout,
            stderr = %result.stderr,
            "Test suite finished"
        );
        Ok(result.passed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_result_passed() {
        let result = SuiteResult {
            artifact: PathBuf::from("tests/test_a.py"),
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            duration_ms: 10,
            success: true,
        };
        assert!(result.passed());

        let failed = SuiteResult {
            exit_code: 1,
            success: false,
            ..result
        };
        assert!(!failed.passed());
    }

    #[test]
    fn test_unittest_command_scoped_to_file() {
        let cmd = BuiltinRunner::Unittest.command(
            "python3",
            Path::new("/p/tests"),
            Path::new("/p/tests/test_foo.py"),
        );
        assert_eq!(
            cmd,
            vec!["python3", "-m", "unittest", "discover", "-s", "/p/tests", "-p", "test_foo.py"]
        );
    }

    #[test]
    fn test_pytest_command_scoped_to_file() {
        let cmd = BuiltinRunner::Pytest.command(
            "python",
            Path::new("/p/tests"),
            Path::new("/p/tests/test_foo.py"),
        );
        assert_eq!(cmd, vec!["python", "-m", "pytest", "-q", "/p/tests/test_foo.py"]);
    }

    #[test]
    fn test_runner_from_str() {
        assert_eq!("unittest".parse::<BuiltinRunner>().unwrap(), BuiltinRunner::Unittest);
        assert_eq!("PyTest".parse::<BuiltinRunner>().unwrap(), BuiltinRunner::Pytest);
        assert!("nose".parse::<BuiltinRunner>().is_err());
    }

    #[test]
    fn test_runner_config_default() {
        let config = RunnerConfig::default();
        assert_eq!(config.runner, BuiltinRunner::Unittest);
        assert_eq!(config.python, "python3");
        assert_eq!(config.timeout_secs, 300);
    }

    #[tokio::test]
    async fn test_missing_artifact_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessTestRunner::default();
        let err = runner
            .run_suite(&dir.path().join("test_missing.py"))
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::Io(_)));
    }

    #[tokio::test]
    async fn test_unknown_interpreter_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("test_a.py");
        std::fs::write(&artifact, "").unwrap();

        let runner = ProcessTestRunner::new(RunnerConfig {
            python: "definitely-not-a-python-binary".to_string(),
            ..RunnerConfig::default()
        });
        let err = runner.run_suite(&artifact).await.unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }
}
