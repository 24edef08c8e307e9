//! Source modules and generation requests.

use std::path::{Path, PathBuf};

/// A source file selected for test generation.
///
/// Identity is the file path; the content is read once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceModule {
    path: PathBuf,
    content: String,
}

impl SourceModule {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read a module from disk.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(path, content))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Final path component, used to derive the artifact name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A prompt bound to the module (or artifact) it was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest<'a> {
    pub prompt: String,
    pub target: &'a Path,
}

impl<'a> GenerationRequest<'a> {
    pub fn new(prompt: String, target: &'a Path) -> Self {
        Self { prompt, target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_is_basename() {
        let module = SourceModule::new("/project/src/pkg/foo.py", "x = 1\n");
        assert_eq!(module.file_name(), "foo.py");
        assert_eq!(module.content(), "x = 1\n");
    }

    #[test]
    fn test_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar.py");
        std::fs::write(&path, "def bar():\n    return 2\n").unwrap();

        let module = SourceModule::read(&path).unwrap();
        assert_eq!(module.path(), path.as_path());
        assert!(module.content().contains("def bar"));
    }

    #[test]
    fn test_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SourceModule::read(&dir.path().join("missing.py")).is_err());
    }
}
