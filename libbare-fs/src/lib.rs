//! Local filesystem access for data-processing frameworks without native helper
//! binaries or shell commands.
//!
//! [`BareLocalFileSystem`] answers status, listing and permission requests by
//! reading the host's attribute views directly. Platforms without POSIX
//! attributes are supported: permission, owner and group are then absent from
//! every [`FileStatus`] and setting permissions does nothing.

pub mod config;
pub mod error;
pub mod fs;
pub mod identity;
mod listing;
pub mod native;
pub mod path;
pub mod permission;
pub mod status;

pub use config::{DEFAULT_BLOCK_SIZE, FsConfig};
pub use error::{FsError, Result};
pub use fs::BareLocalFileSystem;
pub use identity::Platform;
pub use native::{BasicAttributes, HostFs, NativeFs, NativePosixAttributes};
pub use path::{FsUri, PortablePath};
pub use permission::{FsAction, FsPermission, PosixPermissions};
pub use status::{FileKind, FileStatus, PosixAttributes};
