//! Writing exports to disk

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::infrastructure::error::{InfraError, InfraResult};

/// Resolve `target` against `export_dir` unless it is absolute.
pub fn resolve_export_path(export_dir: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        export_dir.join(target)
    }
}

/// Write `contents` to `target`, creating parent directories.
///
/// Returns the path written.
pub fn write_export(export_dir: &Path, target: &Path, contents: &str) -> InfraResult<PathBuf> {
    let path = resolve_export_path(export_dir, target);
    debug!("write_export: {}", path.display());
    if path.is_dir() {
        return Err(InfraError::Export {
            message: format!("{} is a directory", path.display()),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
    }
    fs::write(&path, contents).map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    info!("exported {} bytes to {}", contents.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_relative_target_when_writing_then_lands_in_export_dir() {
        let dir = TempDir::new().unwrap();

        let path = write_export(dir.path(), Path::new("nested/stats.txt"), "hello").unwrap();

        assert_eq!(path, dir.path().join("nested/stats.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), "hello");
    }

    #[test]
    fn given_directory_target_when_writing_then_returns_export_error() {
        let dir = TempDir::new().unwrap();

        let result = write_export(dir.path(), dir.path(), "hello");

        assert!(matches!(result, Err(InfraError::Export { .. })));
    }
}
