use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use libbare_fs::{
    BareLocalFileSystem, BasicAttributes, FsConfig, HostFs, NativeFs, NativePosixAttributes,
    Platform, PortablePath, PosixPermissions,
};

pub const TEST_BLOCK_SIZE: u64 = 64 * 1024;

pub fn config(working_dir: &Path) -> FsConfig {
    FsConfig::default()
        .with_working_dir(working_dir)
        .with_default_block_size(TEST_BLOCK_SIZE)
}

#[allow(dead_code)]
pub fn local_fs(working_dir: &Path) -> BareLocalFileSystem {
    BareLocalFileSystem::new(config(working_dir)).unwrap()
}

#[allow(dead_code)]
pub fn scripted_fs(working_dir: &Path, native: ScriptedFs) -> BareLocalFileSystem<ScriptedFs> {
    BareLocalFileSystem::with_native(config(working_dir), native).unwrap()
}

pub fn portable(path: &Path) -> PortablePath {
    PortablePath::from_native(path, Platform::current())
}

/// `foo.txt` ("foo"), `bar.txt` ("bar") and an empty `foobar/` under `dir`.
#[allow(dead_code)]
pub fn populate(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let foo = dir.join("foo.txt");
    let bar = dir.join("bar.txt");
    let foobar = dir.join("foobar");
    fs::write(&foo, b"foo").unwrap();
    fs::write(&bar, b"bar").unwrap();
    fs::create_dir(&foobar).unwrap();
    (foo, bar, foobar)
}

/// Host filesystem with scripted misbehavior.
#[derive(Debug, Default)]
pub struct ScriptedFs {
    /// Behave like a platform without a POSIX attribute view.
    pub hide_posix: bool,
    /// Removed right after its parent has been enumerated.
    pub vanish_after_enumeration: Option<PathBuf>,
    /// Removed right after its basic attributes have been read.
    pub vanish_after_basic_read: Option<PathBuf>,
    /// Every attribute read of this path fails with permission denied.
    pub denied: Option<PathBuf>,
}

impl ScriptedFs {
    fn check_denied(&self, path: &Path) -> io::Result<()> {
        if self.denied.as_deref() == Some(path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        Ok(())
    }
}

impl NativeFs for ScriptedFs {
    fn basic_attributes(&self, path: &Path) -> io::Result<BasicAttributes> {
        self.check_denied(path)?;
        let attributes = HostFs.basic_attributes(path)?;
        if self.vanish_after_basic_read.as_deref() == Some(path) {
            fs::remove_file(path)?;
        }
        Ok(attributes)
    }

    fn posix_attributes(&self, path: &Path) -> io::Result<Option<NativePosixAttributes>> {
        self.check_denied(path)?;
        if self.hide_posix {
            return Ok(None);
        }
        HostFs.posix_attributes(path)
    }

    fn is_directory_no_follow(&self, path: &Path) -> bool {
        HostFs.is_directory_no_follow(path)
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let children = HostFs.read_dir(dir)?;
        if let Some(victim) = &self.vanish_after_enumeration
            && victim.parent() == Some(dir)
        {
            fs::remove_file(victim)?;
        }
        Ok(children)
    }

    fn set_posix_permissions(
        &self,
        path: &Path,
        permissions: PosixPermissions,
    ) -> io::Result<bool> {
        if self.hide_posix {
            return Ok(false);
        }
        HostFs.set_posix_permissions(path, permissions)
    }
}
