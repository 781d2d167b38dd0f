//! Kernel error numbers.
//!
//! The emulated kernel reports failures the way the original did: a small signed number stored
//! in the calling process's error slot. Codes `1..=31` are contiguous and named by [`NAMES`];
//! `EFAULT` sits apart at 106 and is the only code outside that range with a name.

use std::fmt;

/// A kernel error number (`u.u_error`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Errno(i8);

impl Errno {
    pub const EPERM: Errno = Errno(1);
    pub const ENOENT: Errno = Errno(2);
    pub const ESRCH: Errno = Errno(3);
    pub const EINTR: Errno = Errno(4);
    pub const EIO: Errno = Errno(5);
    pub const ENXIO: Errno = Errno(6);
    pub const E2BIG: Errno = Errno(7);
    pub const ENOEXEC: Errno = Errno(8);
    pub const EBADF: Errno = Errno(9);
    pub const ECHILD: Errno = Errno(10);
    pub const EAGAIN: Errno = Errno(11);
    pub const ENOMEM: Errno = Errno(12);
    pub const EACCES: Errno = Errno(13);
    pub const ENOTBLK: Errno = Errno(14);
    pub const EBUSY: Errno = Errno(15);
    pub const EEXIST: Errno = Errno(16);
    pub const EXDEV: Errno = Errno(17);
    pub const ENODEV: Errno = Errno(18);
    pub const ENOTDIR: Errno = Errno(19);
    pub const EISDIR: Errno = Errno(20);
    pub const EINVAL: Errno = Errno(21);
    pub const ENFILE: Errno = Errno(22);
    pub const EMFILE: Errno = Errno(23);
    pub const ENOTTY: Errno = Errno(24);
    pub const ETXTBSY: Errno = Errno(25);
    pub const EFBIG: Errno = Errno(26);
    pub const ENOSPC: Errno = Errno(27);
    pub const ESPIPE: Errno = Errno(28);
    pub const EROFS: Errno = Errno(29);
    pub const EMLINK: Errno = Errno(30);
    pub const EPIPE: Errno = Errno(31);

    /// Bad address. Deliberately outside the contiguous range.
    pub const EFAULT: Errno = Errno(106);

    pub const fn from_raw(raw: i8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i8 {
        self.0
    }

    /// Symbolic name of this code, if it has one.
    pub fn name(self) -> Option<&'static str> {
        if self == Self::EFAULT {
            return Some("EFAULT");
        }
        usize::try_from(self.0)
            .ok()
            .and_then(|idx| NAMES.get(idx))
            .copied()
            .filter(|name| !name.is_empty())
    }

    /// Inverse of [`Errno::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "EFAULT" {
            return Some(Self::EFAULT);
        }
        NAMES
            .iter()
            .position(|n| !n.is_empty() && *n == name)
            .and_then(|idx| i8::try_from(idx).ok())
            .map(Self)
    }

    /// Every named code, in numeric order.
    pub fn all() -> impl Iterator<Item = Errno> {
        (1..NAMES.len())
            .filter_map(|idx| i8::try_from(idx).ok())
            .map(Errno)
            .chain(std::iter::once(Self::EFAULT))
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Errno({})", self.0),
        }
    }
}

impl fmt::Debug for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for Errno {}

impl From<Errno> for i8 {
    fn from(e: Errno) -> Self {
        e.0
    }
}

/// Names indexed by code. Slot 0 is "no error" and has no name.
const NAMES: [&str; 32] = [
    "", "EPERM", "ENOENT", "ESRCH", "EINTR", "EIO", "ENXIO", "E2BIG", "ENOEXEC", "EBADF",
    "ECHILD", "EAGAIN", "ENOMEM", "EACCES", "ENOTBLK", "EBUSY", "EEXIST", "EXDEV", "ENODEV",
    "ENOTDIR", "EISDIR", "EINVAL", "ENFILE", "EMFILE", "ENOTTY", "ETXTBSY", "EFBIG", "ENOSPC",
    "ESPIPE", "EROFS", "EMLINK", "EPIPE",
];

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn contiguous_codes_render_their_names() {
        assert_eq!(Errno::EPERM.to_string(), "EPERM");
        assert_eq!(Errno::ENXIO.to_string(), "ENXIO");
        assert_eq!(Errno::ENOTTY.to_string(), "ENOTTY");
        assert_eq!(Errno::EPIPE.to_string(), "EPIPE");
        assert_eq!(Errno::EPIPE.raw(), 31);
    }

    #[test]
    fn efault_has_a_dedicated_name() {
        assert_eq!(Errno::EFAULT.raw(), 106);
        assert_eq!(Errno::EFAULT.to_string(), "EFAULT");
        assert_eq!(Errno::from_name("EFAULT"), Some(Errno::EFAULT));
    }

    #[test]
    fn unnamed_codes_fall_back_to_numeric_form() {
        assert_eq!(Errno::from_raw(0).to_string(), "Errno(0)");
        assert_eq!(Errno::from_raw(32).to_string(), "Errno(32)");
        assert_eq!(Errno::from_raw(105).to_string(), "Errno(105)");
        assert_eq!(Errno::from_raw(-4).to_string(), "Errno(-4)");
        assert_eq!(format!("{:?}", Errno::from_raw(99)), "Errno(99)");
    }

    #[test]
    fn all_lists_thirty_two_named_codes() {
        let all: Vec<_> = Errno::all().collect();
        assert_eq!(all.len(), 32);
        assert_eq!(all.first(), Some(&Errno::EPERM));
        assert_eq!(all.last(), Some(&Errno::EFAULT));
    }

    #[test]
    fn from_name_rejects_unknown_and_empty() {
        assert_eq!(Errno::from_name(""), None);
        assert_eq!(Errno::from_name("ENOSYS"), None);
    }

    #[test]
    fn named_codes_round_trip_through_their_names() {
        for e in Errno::all() {
            let rendered = e.to_string();
            assert_eq!(Errno::from_name(&rendered), Some(e), "{rendered}");
            assert_eq!(Errno::from_name(&rendered).map(|e| e.to_string()), Some(rendered));
        }
    }

    proptest! {
        #[test]
        fn rendering_embeds_raw_value_for_unnamed_codes(raw in any::<i8>()) {
            let e = Errno::from_raw(raw);
            match e.name() {
                Some(name) => prop_assert_eq!(e.to_string(), name),
                None => prop_assert_eq!(e.to_string(), format!("Errno({raw})")),
            }
        }
    }
}
