use std::io;
use std::path::{Path, PathBuf};

use crate::core::config::SecurityConfig;

/// Errors that can occur while validating an attachment path
#[derive(Debug, thiserror::Error)]
pub enum PathSecurityError {
    #[error("Path '{path}' is outside allowed root directory '{root}'")]
    OutsideRootDirectory { path: PathBuf, root: PathBuf },

    #[error("Symlink '{path}' points outside allowed root directory")]
    SymlinkOutsideRoot { path: PathBuf },

    #[error("Path is not a regular file: '{path}'")]
    NotAFile { path: PathBuf },

    #[error("Path does not exist: '{path}'")]
    PathNotFound { path: PathBuf },

    #[error("IO error for path '{path}': {error}")]
    IoError { path: PathBuf, error: io::Error },
}

/// Validates a file referenced by a `@path` form value.
///
/// Without a configured root any existing regular file is accepted. With a
/// root, relative paths are resolved against it and the canonical target must
/// stay inside it; symlinks are only followed when `allow_symlinks` is set.
///
/// # Examples
///
/// ```rust,ignore
/// let security = SecurityConfig::default();
/// let file = validate_attachment_path("./report.pdf", &security)?;
/// ```
pub fn validate_attachment_path(
    input_path: &str,
    security: &SecurityConfig,
) -> Result<PathBuf, PathSecurityError> {
    let Some(ref root) = security.root_path else {
        let canonical = canonicalize(Path::new(input_path))?;
        return ensure_file(canonical);
    };

    let canonical_root = root.canonicalize().map_err(|e| PathSecurityError::IoError {
        path: root.clone(),
        error: e,
    })?;

    let path = if Path::new(input_path).is_absolute() {
        PathBuf::from(input_path)
    } else {
        canonical_root.join(input_path)
    };

    if path.is_symlink() && !security.allow_symlinks {
        return Err(PathSecurityError::SymlinkOutsideRoot { path });
    }

    let canonical = canonicalize(&path)?;
    if !canonical.starts_with(&canonical_root) {
        return Err(if path.is_symlink() {
            PathSecurityError::SymlinkOutsideRoot { path }
        } else {
            PathSecurityError::OutsideRootDirectory {
                path: canonical,
                root: canonical_root,
            }
        });
    }

    ensure_file(canonical)
}

fn canonicalize(path: &Path) -> Result<PathBuf, PathSecurityError> {
    path.canonicalize().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            PathSecurityError::PathNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PathSecurityError::IoError {
                path: path.to_path_buf(),
                error: e,
            }
        }
    })
}

fn ensure_file(path: PathBuf) -> Result<PathBuf, PathSecurityError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(PathSecurityError::NotAFile { path })
    }
}
