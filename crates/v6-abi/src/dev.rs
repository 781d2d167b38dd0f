use bitflags::bitflags;
use std::fmt;

/// A device number: major selects the device-switch slot, minor the unit within it.
///
/// In the emulated kernel this is a single 16-bit word with the major in the high byte. Words
/// are stored little-endian, so the serialized form is `[minor, major]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DevNum {
    pub major: u8,
    pub minor: u8,
}

impl DevNum {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    pub const fn from_word(word: u16) -> Self {
        Self {
            major: (word >> 8) as u8,
            minor: word as u8,
        }
    }

    pub const fn to_word(self) -> u16 {
        ((self.major as u16) << 8) | self.minor as u16
    }

    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.to_word().to_le_bytes()
    }
}

impl fmt::Debug for DevNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevNum({}, {})", self.major, self.minor)
    }
}

impl fmt::Display for DevNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.major, self.minor)
    }
}

bitflags! {
    /// Mode passed to a device's `open` (`FREAD`/`FWRITE`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenMode: u8 {
        const READ = 0o1;
        const WRITE = 0o2;
    }
}
