use serde::Serialize;

/// Separator between the domain and the principal in a Windows account name.
const WINDOWS_PRINCIPAL_DOMAIN_SEPARATOR: char = '\\';

/// Host platform traits that change how native results are translated.
///
/// Resolved once when a filesystem is initialized and passed down from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Platform {
    pub is_windows: bool,
}

impl Platform {
    pub const WINDOWS: Platform = Platform { is_windows: true };
    pub const POSIX: Platform = Platform { is_windows: false };

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Platform {
            is_windows: cfg!(windows),
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

/// Strips a `DOMAIN\` qualifier from a user or group name on Windows.
///
/// Everything up to and including the first separator is removed. Names on
/// other platforms are returned unchanged.
pub fn remove_principal_domain(principal_name: &str, platform: Platform) -> String {
    if !platform.is_windows {
        return principal_name.to_string();
    }
    match principal_name.split_once(WINDOWS_PRINCIPAL_DOMAIN_SEPARATOR) {
        Some((_, name)) => name.to_string(),
        None => principal_name.to_string(),
    }
}
