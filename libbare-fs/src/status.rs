//! Status records for single filesystem entries.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Serialize, Serializer};
use tracing::trace;

use crate::error::{FsError, Result};
use crate::identity::{Platform, remove_principal_domain};
use crate::native::NativeFs;
use crate::path::{FsUri, PortablePath, lexically_normalize};
use crate::permission::{FsPermission, to_fs_permission};

/// Local storage keeps a single copy of every block.
const LOCAL_REPLICATION: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
}

/// Permission and ownership, present only when the platform has a POSIX view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosixAttributes {
    pub permission: FsPermission,
    pub owner: String,
    pub group: String,
}

/// One filesystem entry as observed at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    path: PortablePath,
    len: u64,
    kind: FileKind,
    replication: u16,
    block_size: u64,
    #[serde(serialize_with = "serialize_millis")]
    modification_time: SystemTime,
    #[serde(serialize_with = "serialize_millis")]
    access_time: SystemTime,
    posix: Option<PosixAttributes>,
}

impl FileStatus {
    /// Fully qualified portable path of the entry.
    pub fn path(&self) -> &PortablePath {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Symbolic links are not supported; links are reported as what they point to.
    pub fn is_symlink(&self) -> bool {
        false
    }

    pub fn replication(&self) -> u16 {
        self.replication
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn modification_time(&self) -> SystemTime {
        self.modification_time
    }

    pub fn access_time(&self) -> SystemTime {
        self.access_time
    }

    pub fn modification_time_millis(&self) -> i64 {
        millis_since_epoch(self.modification_time)
    }

    pub fn access_time_millis(&self) -> i64 {
        millis_since_epoch(self.access_time)
    }

    pub fn posix_attributes(&self) -> Option<&PosixAttributes> {
        self.posix.as_ref()
    }

    pub fn permission(&self) -> Option<FsPermission> {
        self.posix.as_ref().map(|posix| posix.permission)
    }

    pub fn owner(&self) -> Option<&str> {
        self.posix.as_ref().map(|posix| posix.owner.as_str())
    }

    pub fn group(&self) -> Option<&str> {
        self.posix.as_ref().map(|posix| posix.group.as_str())
    }
}

/// Milliseconds relative to the Unix epoch; negative before it.
fn millis_since_epoch(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_millis())
            .map(|millis| -millis)
            .unwrap_or(i64::MIN),
    }
}

fn serialize_millis<S: Serializer>(
    time: &SystemTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_i64(millis_since_epoch(*time))
}

/// Everything about the owning filesystem a status query needs.
#[derive(Debug, Clone)]
pub(crate) struct StatusContext {
    pub(crate) uri: FsUri,
    /// Qualified portable form of `native_working_dir`.
    pub(crate) working_dir: PortablePath,
    pub(crate) native_working_dir: PathBuf,
    pub(crate) default_block_size: u64,
    pub(crate) platform: Platform,
}

impl StatusContext {
    /// Anchors a relative native path at the working directory.
    pub(crate) fn absolutize<'a>(&self, path: &'a Path) -> Cow<'a, Path> {
        if path.is_absolute() {
            Cow::Borrowed(path)
        } else {
            Cow::Owned(self.native_working_dir.join(path))
        }
    }

    /// Normalizes a native path and re-expresses it as a qualified portable path.
    pub(crate) fn qualify_native(&self, path: &Path) -> PortablePath {
        let normalized = lexically_normalize(&self.absolutize(path));
        PortablePath::from_native(&normalized, self.platform)
            .make_qualified(&self.uri, &self.working_dir)
    }
}

/// Builds the status of the entry at a native path.
///
/// Fails with [`FsError::NotFound`] when the entry does not exist, including when
/// it disappears between the reads that make up the query.
pub(crate) fn file_status<N>(native: &N, path: &Path, ctx: &StatusContext) -> Result<FileStatus>
where
    N: NativeFs + ?Sized,
{
    let path = ctx.absolutize(path);
    let basic = native
        .basic_attributes(&path)
        .map_err(|e| FsError::from_io(&path, e))?;
    let posix = native
        .posix_attributes(&path)
        .map_err(|e| FsError::from_io(&path, e))?
        .map(|attributes| PosixAttributes {
            permission: to_fs_permission(attributes.permissions),
            owner: remove_principal_domain(&attributes.owner, ctx.platform),
            group: remove_principal_domain(&attributes.group, ctx.platform),
        });

    let status = FileStatus {
        path: ctx.qualify_native(&path),
        len: basic.len,
        kind: if basic.is_dir {
            FileKind::Directory
        } else {
            FileKind::File
        },
        replication: LOCAL_REPLICATION,
        block_size: ctx.default_block_size,
        modification_time: basic.modified,
        access_time: basic.accessed,
        posix,
    };
    trace!(path = %status.path, kind = ?status.kind, len = status.len, "file status");
    Ok(status)
}
