//! Portable hierarchical paths and their translation to and from native paths.
//!
//! A [`PortablePath`] is written with `/` separators and may carry a scheme and
//! an authority (`file:/tmp/a`, `file:///tmp/a`, `/tmp/a`, `a/b`). Windows drive
//! paths are kept in the portable form `/C:/dir`.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{FsError, Result};
use crate::identity::Platform;

const SEPARATOR: char = '/';

/// Identity of a filesystem: its URI scheme and authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FsUri {
    scheme: String,
    authority: String,
}

impl FsUri {
    pub fn new(scheme: impl Into<String>, authority: impl Into<String>) -> Result<Self> {
        let scheme = scheme.into();
        if !is_valid_scheme(&scheme) {
            return Err(FsError::InvalidPath(format!("invalid URI scheme `{scheme}`")));
        }
        Ok(FsUri {
            scheme,
            authority: authority.into(),
        })
    }

    /// `file:///`, the identity of the local filesystem.
    pub fn local() -> Self {
        FsUri {
            scheme: "file".to_string(),
            authority: String::new(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }
}

impl Default for FsUri {
    fn default() -> Self {
        Self::local()
    }
}

impl fmt::Display for FsUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/", self.scheme, self.authority)
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Whether `path` starts with a drive specification, with or without a leading
/// slash. Only Windows has drives.
fn has_windows_drive(path: &str, platform: Platform) -> bool {
    if !platform.is_windows {
        return false;
    }
    let bytes = path.as_bytes();
    let start = usize::from(bytes.first() == Some(&b'/'));
    bytes.len() >= start + 2 && bytes[start].is_ascii_alphabetic() && bytes[start + 1] == b':'
}

fn normalize_path(path: &str, platform: Platform) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    if has_windows_drive(path, platform) && !path.starts_with(SEPARATOR) {
        normalized.push(SEPARATOR);
    }
    for c in path.chars() {
        if c == SEPARATOR && normalized.ends_with(SEPARATOR) {
            continue;
        }
        normalized.push(c);
    }
    let drive_root = has_windows_drive(&normalized, platform) && normalized.len() == 4;
    if normalized.len() > 1 && normalized.ends_with(SEPARATOR) && !drive_root {
        normalized.pop();
    }
    normalized
}

/// Removes `.` segments and folds `..` into the preceding segment, without
/// consulting the filesystem.
pub fn lexically_normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }
    components.iter().collect()
}

/// A path in the portable representation.
///
/// The platform it was parsed for decides whether a leading `X:` is a drive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortablePath {
    scheme: Option<String>,
    authority: Option<String>,
    path: String,
    platform: Platform,
}

impl PortablePath {
    /// Parses `path` for the platform this binary was compiled for.
    pub fn new(path: &str) -> Result<Self> {
        Self::parse(path, Platform::current())
    }

    /// Parses `path` with the drive rules of `platform`.
    ///
    /// A prefix up to the first `:` is a scheme only when the rest is empty or
    /// starts with `/`; otherwise the colon belongs to a relative name.
    pub fn parse(path: &str, platform: Platform) -> Result<Self> {
        if path.is_empty() {
            return Err(FsError::InvalidPath(
                "can not create a path from an empty string".to_string(),
            ));
        }

        let mut rest = path;
        let mut scheme = None;
        if !has_windows_drive(rest, platform)
            && let Some(colon) = rest.find(':')
            && rest.find(SEPARATOR).is_none_or(|slash| colon < slash)
            && (colon + 1 == rest.len() || rest[colon + 1..].starts_with(SEPARATOR))
        {
            let candidate = &rest[..colon];
            if !is_valid_scheme(candidate) {
                return Err(FsError::InvalidPath(format!(
                    "invalid URI scheme `{candidate}` in `{path}`"
                )));
            }
            scheme = Some(candidate.to_string());
            rest = &rest[colon + 1..];
        }

        let mut authority = None;
        if let Some(after) = rest.strip_prefix("//") {
            let end = after.find(SEPARATOR).unwrap_or(after.len());
            authority = Some(after[..end].to_string());
            rest = &after[end..];
        }

        let mut normalized = normalize_path(rest, platform);
        if normalized.is_empty() {
            if scheme.is_none() && authority.is_none() {
                return Err(FsError::InvalidPath(format!("`{path}` has no path component")));
            }
            normalized.push(SEPARATOR);
        }

        Ok(PortablePath {
            scheme,
            authority,
            path: normalized,
            platform,
        })
    }

    /// Re-expresses an absolute native path in portable form.
    pub fn from_native(native: &Path, platform: Platform) -> Self {
        let native = native.to_string_lossy();
        let path = if platform.is_windows {
            normalize_path(&native.replace('\\', "/"), platform)
        } else {
            normalize_path(&native, platform)
        };
        PortablePath {
            scheme: None,
            authority: None,
            path,
            platform,
        }
    }

    /// The native form of the path component; scheme and authority are ignored.
    pub fn to_native(&self, platform: Platform) -> PathBuf {
        if !platform.is_windows {
            return PathBuf::from(&self.path);
        }
        let path = if has_windows_drive(&self.path, platform) {
            self.path.trim_start_matches(SEPARATOR)
        } else {
            &self.path
        };
        PathBuf::from(path.replace(SEPARATOR, "\\"))
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// The path component, without scheme or authority.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn is_absolute(&self) -> bool {
        self.path.starts_with(SEPARATOR)
    }

    pub fn is_root(&self) -> bool {
        self.path == "/" || (has_windows_drive(&self.path, self.platform) && self.path.len() <= 4)
    }

    /// The final component, empty for a root.
    pub fn name(&self) -> &str {
        if self.is_root() {
            return "";
        }
        self.path.rsplit(SEPARATOR).next().unwrap_or_default()
    }

    pub fn parent(&self) -> Option<PortablePath> {
        if self.is_root() {
            return None;
        }
        let index = self.path.rfind(SEPARATOR)?;
        let parent = if index == 0 {
            "/".to_string()
        } else {
            normalize_path(&self.path[..=index], self.platform)
        };
        Some(PortablePath {
            scheme: self.scheme.clone(),
            authority: self.authority.clone(),
            path: parent,
            platform: self.platform,
        })
    }

    /// Resolves `child` against `self`. An absolute child replaces the path but
    /// inherits a missing scheme and authority.
    pub fn join(&self, child: &PortablePath) -> PortablePath {
        let path = if child.is_absolute() {
            child.path.clone()
        } else {
            normalize_path(&format!("{}/{}", self.path, child.path), self.platform)
        };
        let (scheme, authority) = if child.scheme.is_some() {
            (child.scheme.clone(), child.authority.clone())
        } else {
            (
                self.scheme.clone(),
                child.authority.clone().or_else(|| self.authority.clone()),
            )
        };
        PortablePath {
            scheme,
            authority,
            path,
            platform: self.platform,
        }
    }

    /// Fills in what the path leaves out: relative paths are resolved against
    /// `working_dir`, and a missing scheme or authority is taken from `uri`.
    pub fn make_qualified(&self, uri: &FsUri, working_dir: &PortablePath) -> PortablePath {
        let mut qualified = if self.is_absolute() {
            self.clone()
        } else {
            working_dir.join(self)
        };
        if qualified.scheme.is_none() {
            qualified.scheme = Some(uri.scheme.clone());
        }
        if qualified.authority.is_none()
            && qualified
                .scheme
                .as_deref()
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case(&uri.scheme))
        {
            qualified.authority = Some(uri.authority.clone());
        }
        qualified
    }
}

impl fmt::Display for PortablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}:")?;
        }
        if let Some(authority) = self.authority.as_deref().filter(|a| !a.is_empty()) {
            write!(f, "//{authority}")?;
        }
        f.write_str(&self.path)
    }
}

impl FromStr for PortablePath {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self> {
        PortablePath::new(s)
    }
}

impl Serialize for PortablePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
