//! Syntax validation for generated Python code.
//!
//! [`check_python_syntax`] is an in-process tree-sitter parse. The grammar is
//! error tolerant and accepts some code Python 3 refuses (Python 2 `print`
//! statements, `return` at module level), so [`PythonCompileCheck`] also hands
//! the code to the interpreter's own `compile()`.

use async_trait::async_trait;
use std::cell::RefCell;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;
use tree_sitter::{Node, Parser};

use crate::error::{SyntaxError, ValidationError};

const MAX_SNIPPET: usize = 80;

/// Reads source from stdin, compiles it, and on failure prints
/// `line<TAB>column<TAB>message` before exiting with status 1.
const COMPILE_SCRIPT: &str = concat!(
    "import sys\n",
    "try:\n",
    "    compile(sys.stdin.buffer.read(), '<string>', 'exec')\n",
    "except (SyntaxError, ValueError) as e:\n",
    "    print('%s\\t%s\\t%s' % (getattr(e, 'lineno', 0) or 0, getattr(e, 'offset', 0) or 0, getattr(e, 'msg', e)))\n",
    "    sys.exit(1)\n",
);

pub const DEFAULT_COMPILE_TIMEOUT: Duration = Duration::from_secs(30);

/// Decides whether candidate code may replace a file on disk.
#[async_trait]
pub trait CodeValidator: Send + Sync {
    async fn validate(&self, code: &str) -> Result<(), ValidationError>;
}

/// Tree-sitter parse only. No subprocess.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSitterCheck;

#[async_trait]
impl CodeValidator for TreeSitterCheck {
    async fn validate(&self, code: &str) -> Result<(), ValidationError> {
        check_python_syntax(code)?;
        Ok(())
    }
}

/// Tree-sitter pre-check, then `compile(code, '<string>', 'exec')` in the
/// configured interpreter.
#[derive(Debug, Clone)]
pub struct PythonCompileCheck {
    python: String,
    timeout: Duration,
}

impl Default for PythonCompileCheck {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl PythonCompileCheck {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            timeout: DEFAULT_COMPILE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn python(&self) -> &str {
        &self.python
    }

    async fn compile(&self, code: &str) -> Result<(), ValidationError> {
        let interpreter_error = |source: std::io::Error| ValidationError::Interpreter {
            program: self.python.clone(),
            source,
        };

        let mut child = Command::new(&self.python)
            .arg("-c")
            .arg(COMPILE_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(interpreter_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(code.as_bytes())
                .await
                .map_err(interpreter_error)?;
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                interpreter_error(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("compile check exceeded {}s", self.timeout.as_secs()),
                ))
            })?
            .map_err(interpreter_error)?;

        if output.status.success() {
            return Ok(());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(python = %self.python, stderr = %stderr, "Compile check rejected code");
        Err(parse_compile_report(&stdout, &stderr).into())
    }
}

#[async_trait]
impl CodeValidator for PythonCompileCheck {
    async fn validate(&self, code: &str) -> Result<(), ValidationError> {
        check_python_syntax(code)?;
        self.compile(code).await
    }
}

/// Turn the compile script's report into a [`SyntaxError`]. Output the script
/// did not produce (an interpreter crash) falls back to the last stderr line.
fn parse_compile_report(stdout: &str, stderr: &str) -> SyntaxError {
    let mut fields = stdout.trim().splitn(3, '\t');
    let line = fields.next().and_then(|f| f.parse().ok());
    let column = fields.next().and_then(|f| f.parse().ok());
    match (line, column, fields.next()) {
        (Some(line), Some(column), Some(message)) => SyntaxError {
            line,
            column,
            snippet: message.chars().take(MAX_SNIPPET).collect(),
        },
        _ => SyntaxError {
            line: 0,
            column: 0,
            snippet: stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("compile check failed")
                .chars()
                .take(MAX_SNIPPET)
                .collect(),
        },
    }
}

thread_local! {
    static PYTHON_PARSER: RefCell<Option<Parser>> = RefCell::new({
        let mut p = Parser::new();
        p.set_language(&tree_sitter_python::LANGUAGE.into()).ok().map(|_| p)
    });
}

/// Check that `code` parses as Python.
///
/// Reports the first `ERROR` or `MISSING` node with a 1-based position.
pub fn check_python_syntax(code: &str) -> Result<(), SyntaxError> {
    PYTHON_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        let parser = slot.as_mut().ok_or_else(|| SyntaxError {
            line: 0,
            column: 0,
            snippet: "python grammar unavailable".to_string(),
        })?;

        let tree = parser.parse(code, None).ok_or_else(|| SyntaxError {
            line: 0,
            column: 0,
            snippet: "parse aborted".to_string(),
        })?;

        match first_error_node(tree.root_node()) {
            None => Ok(()),
            Some(node) => {
                let pos = node.start_position();
                let text = code.get(node.byte_range()).unwrap_or_default();
                let snippet = if node.is_missing() {
                    format!("missing {}", node.kind())
                } else {
                    text.lines().next().unwrap_or_default().chars().take(MAX_SNIPPET).collect()
                };
                Err(SyntaxError {
                    line: pos.row + 1,
                    column: pos.column + 1,
                    snippet,
                })
            }
        }
    })
}

fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error_node)
}
