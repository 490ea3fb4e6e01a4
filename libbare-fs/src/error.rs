use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FsError>;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("File `{}` does not exist.", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid permission: {0}")]
    InvalidPermission(String),
}

impl FsError {
    /// Classifies a native I/O failure on `path`.
    ///
    /// Only `ErrorKind::NotFound` becomes [`FsError::NotFound`]; every other kind,
    /// including permission denied, is kept as [`FsError::Io`].
    pub fn from_io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path },
            _ => FsError::Io { path, source },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }

    /// The native path the failure refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            FsError::NotFound { path } | FsError::Io { path, .. } => Some(path),
            FsError::InvalidPath(_) | FsError::InvalidPermission(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_classification() {
        let err = FsError::from_io("/tmp/missing", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert_eq!(err.path(), Some(Path::new("/tmp/missing")));
        assert_eq!(err.to_string(), "File `/tmp/missing` does not exist.");

        let err = FsError::from_io(
            "/tmp/locked",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(!err.is_not_found());
        match err {
            FsError::Io { path, source } => {
                assert_eq!(path, PathBuf::from("/tmp/locked"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
