//! The character-device switch (`cdevsw`).
//!
//! Slot 0 always holds [`ErrDev`]; any major that is out of range or unassigned resolves to it,
//! so dispatch never fails. The table is built once and is immutable afterwards.

use thiserror::Error;
use v6_abi::{DevNum, OpenMode};
use v6_proc::DeviceContext;

use crate::device::Device;
use crate::errdev::ErrDev;
use crate::memdev::MemDev;
use crate::nulldev::NullDev;
use crate::ttydev::TtyDev;

/// Major numbers of the standard table.
pub mod major {
    pub const ERR: u8 = 0;
    pub const NULL: u8 = 1;
    pub const MEM: u8 = 2;
    pub const SWAP: u8 = 3;
    pub const TTY: u8 = 4;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DevSwError {
    #[error("major 0 is reserved for the error device")]
    ReservedMajor,

    #[error("major {0} is already registered")]
    Duplicate(u8),
}

type Slot = Option<Box<dyn Device>>;

fn slot(dev: impl Device + 'static) -> Slot {
    Some(Box::new(dev))
}

#[derive(Debug)]
pub struct DevSw {
    slots: Vec<Slot>,
}

impl DevSw {
    /// The standard table:
    ///
    /// | major | device |
    /// |---|---|
    /// | 0 | error |
    /// | 1 | null |
    /// | 2 | kernel memory |
    /// | 3 | null (swap placeholder) |
    /// | 4 | terminals |
    pub fn standard() -> Self {
        Self {
            slots: vec![
                slot(ErrDev),
                slot(NullDev),
                slot(MemDev),
                slot(NullDev),
                slot(TtyDev),
            ],
        }
    }

    pub fn builder() -> DevSwBuilder {
        DevSwBuilder {
            slots: vec![slot(ErrDev)],
        }
    }

    /// Number of slots, including unassigned ones.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The device for `major`, or the error device when there is none.
    pub fn resolve(&self, major: u8) -> &dyn Device {
        match self.slots.get(usize::from(major)) {
            Some(Some(dev)) => dev.as_ref(),
            _ => {
                tracing::debug!(major, "devsw: no device, using error device");
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> &dyn Device {
        match self.slots.first() {
            Some(Some(dev)) => dev.as_ref(),
            _ => &ErrDev,
        }
    }

    pub fn open(&self, ctx: &mut dyn DeviceContext, dev: DevNum, mode: OpenMode) {
        self.resolve(dev.major).open(ctx, dev.minor, mode);
    }

    pub fn read(
        &self,
        ctx: &mut dyn DeviceContext,
        dev: DevNum,
        buf: &mut [u8],
        offset: u64,
    ) -> usize {
        self.resolve(dev.major).read(ctx, dev.minor, buf, offset)
    }

    pub fn write(
        &self,
        ctx: &mut dyn DeviceContext,
        dev: DevNum,
        buf: &[u8],
        offset: u64,
    ) -> usize {
        self.resolve(dev.major).write(ctx, dev.minor, buf, offset)
    }

    pub fn close(&self, ctx: &mut dyn DeviceContext, dev: DevNum) {
        self.resolve(dev.major).close(ctx, dev.minor);
    }

    pub fn sgtty(
        &self,
        ctx: &mut dyn DeviceContext,
        dev: DevNum,
        set: Option<&[u16; 3]>,
        get: Option<&mut [u16; 3]>,
    ) {
        self.resolve(dev.major).sgtty(ctx, dev.minor, set, get);
    }
}

impl Default for DevSw {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builds a [`DevSw`] with custom assignments. Slot 0 is pre-filled with [`ErrDev`].
#[derive(Debug)]
pub struct DevSwBuilder {
    slots: Vec<Slot>,
}

impl DevSwBuilder {
    pub fn register(mut self, major: u8, dev: Box<dyn Device>) -> Result<Self, DevSwError> {
        if major == 0 {
            return Err(DevSwError::ReservedMajor);
        }
        let idx = usize::from(major);
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        if self.slots[idx].is_some() {
            return Err(DevSwError::Duplicate(major));
        }
        self.slots[idx] = Some(dev);
        Ok(self)
    }

    pub fn build(self) -> DevSw {
        DevSw { slots: self.slots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use v6_abi::Errno;
    use v6_proc::System;

    #[test]
    fn standard_table_layout() {
        let sw = DevSw::standard();
        let names: Vec<_> = (0..5).map(|m| sw.resolve(m).name()).collect();
        assert_eq!(names, ["err", "null", "mem", "null", "tty"]);
        assert_eq!(sw.len(), 5);
    }

    #[test]
    fn out_of_range_major_falls_back_to_error_device() {
        let sw = DevSw::standard();
        assert_eq!(sw.resolve(5).name(), "err");
        assert_eq!(sw.resolve(255).name(), "err");
    }

    #[test]
    fn unassigned_slot_falls_back_to_error_device() {
        let sw = DevSw::builder()
            .register(3, Box::new(NullDev))
            .unwrap()
            .build();
        assert_eq!(sw.len(), 4);
        assert_eq!(sw.resolve(1).name(), "err");
        assert_eq!(sw.resolve(2).name(), "err");
        assert_eq!(sw.resolve(3).name(), "null");
    }

    #[test]
    fn builder_rejects_major_zero_and_duplicates() {
        assert_eq!(
            DevSw::builder().register(0, Box::new(NullDev)).err(),
            Some(DevSwError::ReservedMajor)
        );
        let err = DevSw::builder()
            .register(1, Box::new(NullDev))
            .and_then(|b| b.register(1, Box::new(MemDev)))
            .err();
        assert_eq!(err, Some(DevSwError::Duplicate(1)));
    }

    #[test]
    fn devnum_dispatch_forwards_minor() {
        let sw = DevSw::standard();
        let mut sys = System::new();
        sys.add_tty(v6_proc::Tty::new(DevNum::new(major::TTY, 0)))
            .unwrap();
        let mut ctx = sys.caller();

        assert_eq!(sw.write(&mut ctx, DevNum::new(major::TTY, 0), b"ok", 0), 2);
        assert_eq!(ctx.last_error(), None);
        assert_eq!(sw.write(&mut ctx, DevNum::new(major::TTY, 1), b"ok", 0), 0);
        assert_eq!(ctx.take_error(), Some(Errno::ENXIO));

        let mut buf = [0u8; 2];
        assert_eq!(sw.read(&mut ctx, DevNum::new(9, 0), &mut buf, 0), 0);
        assert_eq!(ctx.take_error(), Some(Errno::ENXIO));

        sw.open(&mut ctx, DevNum::new(major::NULL, 0), OpenMode::READ);
        sw.close(&mut ctx, DevNum::new(major::SWAP, 1));
        assert_eq!(ctx.last_error(), None);

        sw.sgtty(&mut ctx, DevNum::new(major::MEM, 0), None, None);
        assert_eq!(ctx.take_error(), Some(Errno::ENOTTY));
    }
}
