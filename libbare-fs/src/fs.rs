use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::FsConfig;
use crate::error::{FsError, Result};
use crate::identity::Platform;
use crate::listing;
use crate::native::{HostFs, NativeFs};
use crate::path::{FsUri, PortablePath, lexically_normalize};
use crate::permission::{FsPermission, to_posix_permissions};
use crate::status::{self, FileStatus, StatusContext};

/// Local filesystem accessed directly through the native attribute APIs.
///
/// Every query re-reads storage; nothing is cached and the only state is what
/// [`FsConfig`] fixed at initialization, so an instance can be shared freely
/// between threads.
///
/// Symbolic links are not supported and the sticky bit is neither read nor set.
pub struct BareLocalFileSystem<N: NativeFs = HostFs> {
    native: N,
    ctx: StatusContext,
}

impl BareLocalFileSystem<HostFs> {
    pub fn new(config: FsConfig) -> Result<Self> {
        Self::with_native(config, HostFs)
    }
}

impl<N: NativeFs> BareLocalFileSystem<N> {
    /// Initializes a filesystem over an explicit native backend.
    ///
    /// A missing working directory in `config` resolves to the process current
    /// directory, once.
    pub fn with_native(config: FsConfig, native: N) -> Result<Self> {
        let native_working_dir = match config.working_dir {
            Some(dir) => dir,
            None => env::current_dir().map_err(|e| FsError::from_io(".", e))?,
        };
        if !native_working_dir.is_absolute() {
            return Err(FsError::InvalidPath(format!(
                "working directory `{}` is not absolute",
                native_working_dir.display()
            )));
        }
        let root = PortablePath::parse("/", config.platform)?;
        let working_dir =
            PortablePath::from_native(&lexically_normalize(&native_working_dir), config.platform)
                .make_qualified(&config.uri, &root);

        debug!(
            uri = %config.uri,
            working_dir = %working_dir,
            block_size = config.default_block_size,
            windows = config.platform.is_windows,
            "initialized bare local filesystem"
        );

        Ok(BareLocalFileSystem {
            native,
            ctx: StatusContext {
                uri: config.uri,
                working_dir,
                native_working_dir,
                default_block_size: config.default_block_size,
                platform: config.platform,
            },
        })
    }

    pub fn uri(&self) -> &FsUri {
        &self.ctx.uri
    }

    pub fn working_directory(&self) -> &PortablePath {
        &self.ctx.working_dir
    }

    pub fn default_block_size(&self) -> u64 {
        self.ctx.default_block_size
    }

    pub fn platform(&self) -> Platform {
        self.ctx.platform
    }

    /// Always `false`.
    ///
    /// Other operations do not check this themselves; callers with link-specific
    /// code paths must.
    pub fn supports_symlinks(&self) -> bool {
        false
    }

    /// Translates a portable path to the native path it denotes.
    ///
    /// Relative paths are resolved against the working directory. A path that
    /// names another filesystem is rejected.
    pub fn to_native_path(&self, path: &PortablePath) -> Result<PathBuf> {
        self.check_path(path)?;
        let qualified = path.make_qualified(&self.ctx.uri, &self.ctx.working_dir);
        Ok(qualified.to_native(self.ctx.platform))
    }

    fn check_path(&self, path: &PortablePath) -> Result<()> {
        let uri = &self.ctx.uri;
        let scheme_matches = path
            .scheme()
            .is_none_or(|scheme| scheme.eq_ignore_ascii_case(uri.scheme()));
        let authority_matches = path
            .authority()
            .is_none_or(|authority| authority.is_empty() || authority == uri.authority());
        if scheme_matches && authority_matches {
            Ok(())
        } else {
            Err(FsError::InvalidPath(format!(
                "Wrong FS: {path}, expected: {uri}"
            )))
        }
    }

    pub fn get_file_status(&self, path: &PortablePath) -> Result<FileStatus> {
        let native_path = self.to_native_path(path)?;
        self.get_file_status_native(&native_path)
    }

    pub fn get_file_status_native(&self, path: &Path) -> Result<FileStatus> {
        status::file_status(&self.native, path, &self.ctx)
    }

    /// Lists the children of a directory, or the path itself when it is not one.
    ///
    /// A child deleted while the listing runs is left out; any other failure on
    /// a child aborts the listing.
    pub fn list_status(&self, path: &PortablePath) -> Result<Vec<FileStatus>> {
        let native_path = self.to_native_path(path)?;
        self.list_status_native(&native_path)
    }

    pub fn list_status_native(&self, path: &Path) -> Result<Vec<FileStatus>> {
        listing::list_status(&self.native, path, &self.ctx)
    }

    /// `Ok(false)` only when the path does not exist; other failures propagate.
    pub fn exists(&self, path: &PortablePath) -> Result<bool> {
        match self.get_file_status(path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Applies `permission` through the POSIX view of the path.
    ///
    /// On platforms without a POSIX view nothing happens and no error is raised.
    pub fn set_permission(&self, path: &PortablePath, permission: &FsPermission) -> Result<()> {
        let native_path = self.to_native_path(path)?;
        let applied = self
            .native
            .set_posix_permissions(&native_path, to_posix_permissions(permission))
            .map_err(|e| FsError::from_io(&native_path, e))?;
        if applied {
            debug!("set permission {permission} on {}", native_path.display());
        } else {
            debug!(
                "no POSIX attribute view for {}, permission left unchanged",
                native_path.display()
            );
        }
        Ok(())
    }
}

impl<N: NativeFs> fmt::Display for BareLocalFileSystem<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BareLocalFS")
    }
}

impl<N: NativeFs> fmt::Debug for BareLocalFileSystem<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BareLocalFileSystem")
            .field("uri", &self.ctx.uri)
            .field("working_dir", &self.ctx.working_dir)
            .field("default_block_size", &self.ctx.default_block_size)
            .field("platform", &self.ctx.platform)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_initialize_with_explicit_working_dir() {
        let tmp_dir = tempdir().unwrap();
        let fs = BareLocalFileSystem::new(
            FsConfig::default()
                .with_working_dir(tmp_dir.path())
                .with_default_block_size(1 << 20),
        )
        .unwrap();

        assert_eq!(fs.default_block_size(), 1 << 20);
        assert_eq!(fs.working_directory().scheme(), Some("file"));
        assert_eq!(
            fs.to_native_path(&PortablePath::new("a/b.txt").unwrap()).unwrap(),
            tmp_dir.path().join("a/b.txt")
        );
        assert!(!fs.supports_symlinks());
        assert_eq!(fs.to_string(), "BareLocalFS");
    }

    #[test]
    fn test_relative_working_dir_is_rejected() {
        let result = BareLocalFileSystem::new(FsConfig::default().with_working_dir("relative"));
        assert!(matches!(result, Err(FsError::InvalidPath(_))));
    }

    #[test]
    fn test_wrong_filesystem_is_rejected() {
        let fs = BareLocalFileSystem::new(FsConfig::default()).unwrap();
        let foreign = PortablePath::new("hdfs://namenode/data").unwrap();

        let err = fs.get_file_status(&foreign).unwrap_err();
        assert!(matches!(err, FsError::InvalidPath(msg) if msg.starts_with("Wrong FS")));
        assert!(fs.to_native_path(&PortablePath::new("file:///tmp").unwrap()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_colon_names_on_posix() {
        let tmp_dir = tempdir().unwrap();
        let fs = BareLocalFileSystem::new(
            FsConfig::default()
                .with_working_dir(tmp_dir.path())
                .with_platform(Platform::POSIX),
        )
        .unwrap();
        let posix = |s: &str| PortablePath::parse(s, Platform::POSIX).unwrap();

        assert_eq!(
            fs.to_native_path(&posix("y:relative")).unwrap(),
            tmp_dir.path().join("y:relative")
        );
        let err = fs.to_native_path(&posix("x:/etc/hostname")).unwrap_err();
        assert!(matches!(err, FsError::InvalidPath(msg) if msg.starts_with("Wrong FS")));
    }
}
