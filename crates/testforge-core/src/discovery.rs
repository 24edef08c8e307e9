//! Source module discovery.

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;

/// Recursively list the modules under `root`.
///
/// Files qualify when their name ends in `.{extension}` and is not one of the
/// excluded names. Results are absolute and ordered by a name-sorted walk, so
/// repeated runs see modules in the same order. An empty result is logged as
/// a warning and returned as `Ok`.
pub fn discover_modules(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::SourceRootMissing(root.to_path_buf()));
    }

    let root = root.canonicalize().map_err(|e| DiscoveryError::Walk {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;

    let suffix = format!(".{}", config.extension);
    let mut modules = Vec::new();

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry during discovery");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.ends_with(&suffix) && !config.excluded_names.iter().any(|n| n.as_str() == name.as_ref()) {
            modules.push(entry.into_path());
        }
    }

    if modules.is_empty() {
        warn!(root = %root.display(), "No source modules found");
    } else {
        info!(count = modules.len(), "Discovered source modules:");
        for module in &modules {
            info!(" - {}", module.display());
        }
    }

    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x = 1\n").unwrap();
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let err = discover_modules(&dir.path().join("src"), &DiscoveryConfig::default())
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::SourceRootMissing(_)));
    }

    #[test]
    fn test_empty_root_returns_empty() {
        let dir = tempdir().unwrap();
        let modules = discover_modules(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert!(modules.is_empty());
    }

    #[test]
    fn test_excludes_initializers_and_other_extensions() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("__init__.py"));
        touch(&root.join("alpha.py"));
        touch(&root.join("notes.txt"));
        touch(&root.join("pkg/__init__.py"));
        touch(&root.join("pkg/beta.py"));
        touch(&root.join("pkg/deep/gamma.py"));
        touch(&root.join("script.pyc"));

        let modules = discover_modules(root, &DiscoveryConfig::default()).unwrap();
        let names: Vec<String> = modules
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names.len(), 3);
        assert!(names.contains(&"alpha.py".to_string()));
        assert!(names.contains(&"beta.py".to_string()));
        assert!(names.contains(&"gamma.py".to_string()));
        assert!(modules.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_order_is_deterministic() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("zeta.py"));
        touch(&root.join("alpha.py"));
        touch(&root.join("mid.py"));

        let first = discover_modules(root, &DiscoveryConfig::default()).unwrap();
        let second = discover_modules(root, &DiscoveryConfig::default()).unwrap();
        assert_eq!(first, second);

        let names: Vec<_> = first
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["alpha.py", "mid.py", "zeta.py"]);
    }

    #[test]
    fn test_file_as_root_is_missing() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("main.py");
        touch(&file);
        assert!(matches!(
            discover_modules(&file, &DiscoveryConfig::default()),
            Err(DiscoveryError::SourceRootMissing(_))
        ));
    }
}
