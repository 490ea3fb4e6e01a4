//! Attribute views over the native filesystem.
//!
//! [`NativeFs`] splits what the host can report into a basic view that every
//! platform provides and an optional POSIX view. [`HostFs`] is the
//! implementation backed by `std::fs`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::permission::PosixPermissions;

/// Attributes every platform reports. Symbolic links are followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAttributes {
    pub len: u64,
    pub is_dir: bool,
    pub modified: SystemTime,
    pub accessed: SystemTime,
}

/// Raw POSIX attributes, before owner and group names are normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativePosixAttributes {
    pub permissions: PosixPermissions,
    pub owner: String,
    pub group: String,
}

pub trait NativeFs: Send + Sync {
    /// Reads the basic view of `path`.
    fn basic_attributes(&self, path: &Path) -> io::Result<BasicAttributes>;

    /// Reads the POSIX view of `path`, or `Ok(None)` when the platform has none.
    fn posix_attributes(&self, path: &Path) -> io::Result<Option<NativePosixAttributes>>;

    /// Whether `path` is a directory, without following a final symbolic link.
    ///
    /// Any failure to read the entry answers `false`.
    fn is_directory_no_follow(&self, path: &Path) -> bool;

    /// The paths of the immediate children of `dir`, in no particular order.
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Replaces the permission bits of `path`.
    ///
    /// Returns `Ok(false)` without touching anything when the platform has no POSIX view.
    fn set_posix_permissions(&self, path: &Path, permissions: PosixPermissions)
    -> io::Result<bool>;
}

/// The host operating system's filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

impl NativeFs for HostFs {
    fn basic_attributes(&self, path: &Path) -> io::Result<BasicAttributes> {
        let metadata = fs::metadata(path)?;
        let modified = metadata.modified()?;
        Ok(BasicAttributes {
            len: metadata.len(),
            is_dir: metadata.is_dir(),
            modified,
            // some filesystems do not record access times
            accessed: metadata.accessed().unwrap_or(modified),
        })
    }

    #[cfg(unix)]
    fn posix_attributes(&self, path: &Path) -> io::Result<Option<NativePosixAttributes>> {
        use std::os::unix::fs::MetadataExt;

        // second read may observe a concurrent delete
        let metadata = fs::metadata(path)?;
        Ok(Some(NativePosixAttributes {
            permissions: PosixPermissions::from_mode(metadata.mode()),
            owner: unix_names::user_name(metadata.uid())?,
            group: unix_names::group_name(metadata.gid())?,
        }))
    }

    #[cfg(not(unix))]
    fn posix_attributes(&self, _path: &Path) -> io::Result<Option<NativePosixAttributes>> {
        Ok(None)
    }

    fn is_directory_no_follow(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false)
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(dir)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect()
    }

    #[cfg(unix)]
    fn set_posix_permissions(
        &self,
        path: &Path,
        permissions: PosixPermissions,
    ) -> io::Result<bool> {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, fs::Permissions::from_mode(permissions.mode()))?;
        Ok(true)
    }

    #[cfg(not(unix))]
    fn set_posix_permissions(
        &self,
        _path: &Path,
        _permissions: PosixPermissions,
    ) -> io::Result<bool> {
        Ok(false)
    }
}

#[cfg(unix)]
mod unix_names {
    use std::io;

    use nix::unistd::{Gid, Group, Uid, User};

    /// Name of the user with id `uid`, or the decimal id when the user database has no entry.
    pub fn user_name(uid: u32) -> io::Result<String> {
        Ok(User::from_uid(Uid::from_raw(uid))?
            .map(|user| user.name)
            .unwrap_or_else(|| uid.to_string()))
    }

    /// Name of the group with id `gid`, or the decimal id when the group database has no entry.
    pub fn group_name(gid: u32) -> io::Result<String> {
        Ok(Group::from_gid(Gid::from_raw(gid))?
            .map(|group| group.name)
            .unwrap_or_else(|| gid.to_string()))
    }
}
