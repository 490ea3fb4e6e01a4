//! Portable permission triad and its native POSIX counterpart.
//!
//! [`FsPermission`] is the owner/group/other × read/write/execute model used by
//! callers. [`PosixPermissions`] is the set of nine native permission flags. The
//! two are converted with [`to_posix_permissions`] and [`to_fs_permission`]; the
//! representation has no redundancy, so both directions are bijections.
//!
//! Sticky, setuid and setgid bits are not modeled.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Serialize, Serializer};

use crate::error::FsError;

bitflags! {
    /// Actions a single principal class may perform.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FsAction: u8 {
        const READ = 0b100;
        const WRITE = 0b010;
        const EXECUTE = 0b001;
    }
}

impl FsAction {
    pub const NONE: Self = Self::empty();
    pub const READ_WRITE: Self = Self::READ.union(Self::WRITE);
    pub const READ_EXECUTE: Self = Self::READ.union(Self::EXECUTE);
    pub const WRITE_EXECUTE: Self = Self::WRITE.union(Self::EXECUTE);
    pub const ALL: Self = Self::all();

    /// Whether every action in `other` is also granted by `self`.
    pub fn implies(self, other: FsAction) -> bool {
        self.contains(other)
    }

    /// `rwx`-style rendering, `-` for each missing action.
    pub fn symbol(self) -> &'static str {
        const SYMBOLS: [&str; 8] = ["---", "--x", "-w-", "-wx", "r--", "r-x", "rw-", "rwx"];
        SYMBOLS[self.bits() as usize]
    }
}

impl fmt::Display for FsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Composes an action from three independent grants.
pub fn fs_action_of(read: bool, write: bool, execute: bool) -> FsAction {
    let mut action = FsAction::NONE;
    action.set(FsAction::READ, read);
    action.set(FsAction::WRITE, write);
    action.set(FsAction::EXECUTE, execute);
    action
}

/// The permission triad: one [`FsAction`] each for the owner, group and others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FsPermission {
    pub user: FsAction,
    pub group: FsAction,
    pub other: FsAction,
}

impl FsPermission {
    pub fn new(user: FsAction, group: FsAction, other: FsAction) -> Self {
        FsPermission { user, group, other }
    }

    /// Builds a triad from the low nine bits of `mode`; higher bits are dropped.
    pub fn from_mode(mode: u16) -> Self {
        FsPermission {
            user: FsAction::from_bits_truncate((mode >> 6) as u8),
            group: FsAction::from_bits_truncate((mode >> 3) as u8),
            other: FsAction::from_bits_truncate(mode as u8),
        }
    }

    pub fn to_mode(self) -> u16 {
        (u16::from(self.user.bits()) << 6)
            | (u16::from(self.group.bits()) << 3)
            | u16::from(self.other.bits())
    }

    fn parse_symbolic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 9 {
            return None;
        }
        let mut actions = [FsAction::NONE; 3];
        for (class, chunk) in bytes.chunks(3).enumerate() {
            let mut action = FsAction::NONE;
            for (flag, (&c, expected)) in [FsAction::READ, FsAction::WRITE, FsAction::EXECUTE]
                .into_iter()
                .zip(chunk.iter().zip(*b"rwx"))
            {
                match c {
                    b'-' => {}
                    c if c == expected => action |= flag,
                    _ => return None,
                }
            }
            actions[class] = action;
        }
        Some(FsPermission::new(actions[0], actions[1], actions[2]))
    }

    fn parse_octal(s: &str) -> Option<Self> {
        if !(s.len() == 3 || s.len() == 4) || !s.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return None;
        }
        let mode = u16::from_str_radix(s, 8).ok()?;
        // special bits are not modeled
        if mode > 0o777 {
            return None;
        }
        Some(FsPermission::from_mode(mode))
    }
}

impl fmt::Display for FsPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.user, self.group, self.other)
    }
}

impl FromStr for FsPermission {
    type Err = FsError;

    /// Accepts `755`, `0644` or `rwxr-x---`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_octal(s)
            .or_else(|| Self::parse_symbolic(s))
            .ok_or_else(|| FsError::InvalidPermission(s.to_string()))
    }
}

impl Serialize for FsPermission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

bitflags! {
    /// The nine native POSIX permission flags, valued as their mode bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PosixPermissions: u32 {
        const OWNER_READ = 0o400;
        const OWNER_WRITE = 0o200;
        const OWNER_EXECUTE = 0o100;
        const GROUP_READ = 0o040;
        const GROUP_WRITE = 0o020;
        const GROUP_EXECUTE = 0o010;
        const OTHERS_READ = 0o004;
        const OTHERS_WRITE = 0o002;
        const OTHERS_EXECUTE = 0o001;
    }
}

impl PosixPermissions {
    /// Keeps only the nine permission bits of a native mode.
    pub fn from_mode(mode: u32) -> Self {
        Self::from_bits_truncate(mode)
    }

    pub fn mode(self) -> u32 {
        self.bits()
    }
}

/// Read, write and execute flags of one principal class.
type ClassFlags = [(FsAction, PosixPermissions); 3];

const OWNER_FLAGS: ClassFlags = [
    (FsAction::READ, PosixPermissions::OWNER_READ),
    (FsAction::WRITE, PosixPermissions::OWNER_WRITE),
    (FsAction::EXECUTE, PosixPermissions::OWNER_EXECUTE),
];

const GROUP_FLAGS: ClassFlags = [
    (FsAction::READ, PosixPermissions::GROUP_READ),
    (FsAction::WRITE, PosixPermissions::GROUP_WRITE),
    (FsAction::EXECUTE, PosixPermissions::GROUP_EXECUTE),
];

const OTHERS_FLAGS: ClassFlags = [
    (FsAction::READ, PosixPermissions::OTHERS_READ),
    (FsAction::WRITE, PosixPermissions::OTHERS_WRITE),
    (FsAction::EXECUTE, PosixPermissions::OTHERS_EXECUTE),
];

fn class_to_native(action: FsAction, flags: &ClassFlags) -> PosixPermissions {
    flags
        .iter()
        .filter(|(implied, _)| action.implies(*implied))
        .fold(PosixPermissions::empty(), |acc, (_, flag)| acc | *flag)
}

fn class_from_native(permissions: PosixPermissions, flags: &ClassFlags) -> FsAction {
    let [(_, read), (_, write), (_, execute)] = flags;
    fs_action_of(
        permissions.contains(*read),
        permissions.contains(*write),
        permissions.contains(*execute),
    )
}

/// Converts a permission triad to the equivalent set of native flags.
pub fn to_posix_permissions(permission: &FsPermission) -> PosixPermissions {
    class_to_native(permission.user, &OWNER_FLAGS)
        | class_to_native(permission.group, &GROUP_FLAGS)
        | class_to_native(permission.other, &OTHERS_FLAGS)
}

/// Converts a set of native flags to the equivalent permission triad.
pub fn to_fs_permission(permissions: PosixPermissions) -> FsPermission {
    FsPermission::new(
        class_from_native(permissions, &OWNER_FLAGS),
        class_from_native(permissions, &GROUP_FLAGS),
        class_from_native(permissions, &OTHERS_FLAGS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen, quickcheck};

    impl Arbitrary for FsPermission {
        fn arbitrary(g: &mut Gen) -> Self {
            FsPermission::new(
                FsAction::from_bits_truncate(u8::arbitrary(g)),
                FsAction::from_bits_truncate(u8::arbitrary(g)),
                FsAction::from_bits_truncate(u8::arbitrary(g)),
            )
        }
    }

    #[derive(Debug, Clone)]
    struct AnyPosixPermissions(PosixPermissions);

    impl Arbitrary for AnyPosixPermissions {
        fn arbitrary(g: &mut Gen) -> Self {
            AnyPosixPermissions(PosixPermissions::from_bits_truncate(u32::arbitrary(g)))
        }
    }

    #[test]
    fn test_to_posix_permissions() {
        assert_eq!(
            to_posix_permissions(&FsPermission::new(
                FsAction::NONE,
                FsAction::NONE,
                FsAction::NONE
            )),
            PosixPermissions::empty()
        );
        assert_eq!(
            to_posix_permissions(&FsPermission::new(
                FsAction::ALL,
                FsAction::READ_EXECUTE,
                FsAction::READ
            )),
            PosixPermissions::OWNER_READ
                | PosixPermissions::OWNER_WRITE
                | PosixPermissions::OWNER_EXECUTE
                | PosixPermissions::GROUP_READ
                | PosixPermissions::GROUP_EXECUTE
                | PosixPermissions::OTHERS_READ
        );
        assert_eq!(
            to_posix_permissions(&FsPermission::new(FsAction::ALL, FsAction::ALL, FsAction::ALL)),
            PosixPermissions::all()
        );
    }

    #[test]
    fn test_to_fs_permission() {
        assert_eq!(
            to_fs_permission(PosixPermissions::empty()),
            FsPermission::new(FsAction::NONE, FsAction::NONE, FsAction::NONE)
        );
        assert_eq!(
            to_fs_permission(
                PosixPermissions::OWNER_READ
                    | PosixPermissions::OWNER_WRITE
                    | PosixPermissions::OWNER_EXECUTE
                    | PosixPermissions::GROUP_READ
                    | PosixPermissions::GROUP_EXECUTE
                    | PosixPermissions::OTHERS_READ
            ),
            FsPermission::new(FsAction::ALL, FsAction::READ_EXECUTE, FsAction::READ)
        );
        assert_eq!(
            to_fs_permission(PosixPermissions::all()),
            FsPermission::new(FsAction::ALL, FsAction::ALL, FsAction::ALL)
        );
    }

    #[test]
    fn test_fs_action_of() {
        assert_eq!(fs_action_of(false, false, false), FsAction::NONE);
        assert_eq!(fs_action_of(true, false, false), FsAction::READ);
        assert_eq!(fs_action_of(false, true, false), FsAction::WRITE);
        assert_eq!(fs_action_of(false, false, true), FsAction::EXECUTE);
        assert_eq!(fs_action_of(true, false, true), FsAction::READ_EXECUTE);
        assert_eq!(fs_action_of(true, true, true), FsAction::ALL);
    }

    #[test]
    fn test_triad_round_trips_through_native() {
        fn prop(permission: FsPermission) -> bool {
            to_fs_permission(to_posix_permissions(&permission)) == permission
        }
        quickcheck(prop as fn(FsPermission) -> bool);
    }

    #[test]
    fn test_native_round_trips_through_triad() {
        fn prop(permissions: AnyPosixPermissions) -> bool {
            to_posix_permissions(&to_fs_permission(permissions.0)) == permissions.0
        }
        quickcheck(prop as fn(AnyPosixPermissions) -> bool);
    }

    #[test]
    fn test_native_flags_match_mode_bits() {
        fn prop(mode: u16) -> bool {
            let permission = FsPermission::from_mode(mode);
            permission.to_mode() == mode & 0o777
                && to_posix_permissions(&permission).mode() == u32::from(mode & 0o777)
        }
        quickcheck(prop as fn(u16) -> bool);
    }

    #[test]
    fn test_parse_and_display() {
        let symbolic: FsPermission = "rwxr-x---".parse().unwrap();
        let octal: FsPermission = "750".parse().unwrap();
        assert_eq!(symbolic, octal);
        assert_eq!(symbolic.to_string(), "rwxr-x---");
        assert_eq!("0644".parse::<FsPermission>().unwrap().to_mode(), 0o644);
        assert_eq!("---------".parse::<FsPermission>().unwrap().to_mode(), 0);

        for bad in ["", "75", "1777", "789", "rwxrwxrw", "rwxrwxrwt", "wrxr-x---"] {
            assert!(
                matches!(bad.parse::<FsPermission>(), Err(FsError::InvalidPermission(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_action_implies() {
        assert!(FsAction::ALL.implies(FsAction::READ_WRITE));
        assert!(FsAction::READ_EXECUTE.implies(FsAction::EXECUTE));
        assert!(!FsAction::READ.implies(FsAction::WRITE));
        assert!(FsAction::NONE.implies(FsAction::NONE));
        assert_eq!(FsAction::WRITE_EXECUTE.to_string(), "-wx");
    }
}
