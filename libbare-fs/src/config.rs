use std::path::PathBuf;

use crate::identity::Platform;
use crate::path::FsUri;

/// Block size reported for local files, 32 MiB.
pub const DEFAULT_BLOCK_SIZE: u64 = 32 * 1024 * 1024;

/// Settings fixed when a [`BareLocalFileSystem`](crate::BareLocalFileSystem) is initialized.
#[derive(Debug, Clone)]
pub struct FsConfig {
    /// Identity used to qualify every reported path.
    pub uri: FsUri,
    /// Native working directory; `None` means the process current directory.
    pub working_dir: Option<PathBuf>,
    pub default_block_size: u64,
    pub platform: Platform,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            uri: FsUri::local(),
            working_dir: None,
            default_block_size: DEFAULT_BLOCK_SIZE,
            platform: Platform::current(),
        }
    }
}

impl FsConfig {
    pub fn with_uri(mut self, uri: FsUri) -> Self {
        self.uri = uri;
        self
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(working_dir.into());
        self
    }

    pub fn with_default_block_size(mut self, block_size: u64) -> Self {
        self.default_block_size = block_size;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}
